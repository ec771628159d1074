use super::*;

#[derive(Clone, Copy)]
pub struct AttachmentCache<'r> {
    parents: &'r dyn ParentLoader,
}

impl<'r> AttachmentCache<'r> {
    pub fn new(parents: &'r dyn ParentLoader) -> Self {
        Self { parents }
    }
}

impl std::fmt::Debug for AttachmentCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("AttachmentCache").finish_non_exhaustive()
    }
}

impl EntityCache for AttachmentCache<'_> {
    type Entity = Attachment;

    const NAME: &'static str = "AttachmentCache";

    fn instance_id(attachment: &Attachment) -> &str {
        attachment.id.as_str()
    }

    fn derive_instance_params(
        &self,
        keys: &CacheKeys,
        attachment: &Attachment,
    ) -> Result<InstanceParams> {
        let thing_id = attachment.thing_id.as_str();
        let params = keys.instance_params_by_id(&ThingCache::new(self.parents), thing_id, || {
            self.parents.load_thing(thing_id)
        })?;
        Ok(InstanceParams {
            attachment: Some(attachment.name.clone()),
            attachment_id: Some(attachment.id.to_string()),
            ..params
        })
    }

    // The responses of the owning thing are cleared through
    // the cache of the thing itself.
    fn list_prefixes(&self, _: &InstanceParams) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }

    fn list_other_keys(
        &self,
        _: &CacheKeys,
        params: &InstanceParams,
    ) -> Result<BTreeSet<String>> {
        Ok([ThingCache::attachments_key(&params.dataset_id)].into())
    }
}
