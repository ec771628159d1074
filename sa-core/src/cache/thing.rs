use super::*;

/// Parameters of any thing that can own attachments.
#[derive(Clone, Copy)]
pub struct ThingCache<'r> {
    parents: &'r dyn ParentLoader,
}

impl<'r> ThingCache<'r> {
    pub fn new(parents: &'r dyn ParentLoader) -> Self {
        Self { parents }
    }

    pub fn attachments_key(dataset_id: &str) -> String {
        format!("dataset:v1:{dataset_id}:attachments-by-thing_id")
    }

    /// A mapping from thing ids to attachments of a whole dataset.
    pub fn get_attachments<T, E, F>(
        keys: &CacheKeys,
        dataset_id: &str,
        calculate: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&str) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        keys.get_or_compute(&Self::attachments_key(dataset_id), || {
            calculate(dataset_id)
        })
    }
}

impl std::fmt::Debug for ThingCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ThingCache").finish_non_exhaustive()
    }
}

impl EntityCache for ThingCache<'_> {
    type Entity = Thing;

    const NAME: &'static str = "ThingWithAttachmentCache";

    fn instance_id(thing: &Thing) -> &str {
        thing.id.as_str()
    }

    fn derive_instance_params(&self, keys: &CacheKeys, thing: &Thing) -> Result<InstanceParams> {
        let params = keys.instance_params_by_id(&DataSetCache, thing.dataset_id.as_str(), || {
            self.parents.load_dataset(thing.dataset_id.as_str())
        })?;
        Ok(InstanceParams {
            thing: Some(thing.id.to_string()),
            ..params
        })
    }

    fn list_prefixes(&self, _: &InstanceParams) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}
