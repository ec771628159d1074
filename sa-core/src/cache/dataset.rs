use super::*;
use crate::entities::*;

#[derive(Debug, Default, Clone, Copy)]
pub struct DataSetCache;

impl DataSetCache {
    pub fn submission_sets_key_prefix(owner_id: &str) -> String {
        format!("{}:v1:{owner_id}:submission_sets", Self::NAME)
    }

    /// Keys of all submission set aggregates of the owner's datasets.
    pub fn submission_sets_keys(keys: &CacheKeys, owner_id: &str) -> Result<BTreeSet<String>> {
        keys.keys_with_prefixes([&Self::submission_sets_key_prefix(owner_id)])
    }

    /// An aggregate over the submission sets of all datasets of an owner.
    pub fn get_submission_sets<T, E, F>(
        keys: &CacheKeys,
        owner_id: &str,
        params: &[(&str, &str)],
        calculate: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&str) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let prefix = Self::submission_sets_key_prefix(owner_id);
        let key = CacheKeys::key_with_params(&prefix, params);
        keys.cached_response(&prefix, &key, || calculate(owner_id))
    }

    /// Every cached response of a dataset is tracked under this
    /// prefix as well, so that all of them can be dropped at once,
    /// e.g. when the permission rules of the dataset change.
    pub fn responses_prefix(owner: &str, dataset: &str) -> String {
        format!("{}:v1:{owner}:{dataset}:responses", Self::NAME)
    }

    /// Like [`CacheKeys::cached_response`], but the key is also
    /// cleared together with the dataset.
    pub fn cached_response<T, E, F>(
        keys: &CacheKeys,
        (owner, dataset): (&str, &str),
        prefix: &str,
        key: &str,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let value = keys.cached_response(prefix, key, compute)?;
        // The registry may expire before the response
        keys.register_key(&Self::responses_prefix(owner, dataset), key)?;
        Ok(value)
    }
}

impl EntityCache for DataSetCache {
    type Entity = DataSet;

    const NAME: &'static str = "DataSetCache";

    fn instance_id(dataset: &DataSet) -> &str {
        dataset.id.as_str()
    }

    fn derive_instance_params(&self, _: &CacheKeys, dataset: &DataSet) -> Result<InstanceParams> {
        Ok(InstanceParams {
            owner: dataset.owner.username.clone(),
            owner_id: dataset.owner.id.to_string(),
            dataset: dataset.slug.clone(),
            dataset_id: dataset.id.to_string(),
            ..Default::default()
        })
    }

    fn list_prefixes(&self, params: &InstanceParams) -> Result<BTreeSet<String>> {
        let (owner, dataset) = (params.owner.as_str(), params.dataset.as_str());
        let mut prefixes = Prefixes::default();
        prefixes.add(Route::DataSetDetail, &[owner, dataset])?;
        prefixes.add(Route::DataSetList, &[owner])?;
        prefixes.add(Route::PlaceList, &[owner, dataset])?;
        prefixes.add(Route::DataSetSubmissionList, &[owner, dataset, ALL_SUBMISSIONS])?;
        prefixes.add(Route::ActionList, &[owner, dataset])?;
        prefixes.add(Route::V1DataSetInstanceByUser, &[owner, dataset])?;
        prefixes.add(Route::V1DataSetCollectionByUser, &[owner])?;
        prefixes.add(Route::V1PlaceCollectionByDataSet, &[owner, dataset])?;
        prefixes.add(Route::V1TabularPlaceCollectionByDataSet, &[owner, dataset])?;
        prefixes.add(Route::V1AllSubmissionsByDataSet, &[owner, dataset, ALL_SUBMISSIONS])?;
        prefixes.add(
            Route::V1TabularAllSubmissionsByDataSet,
            &[owner, dataset, ALL_SUBMISSIONS],
        )?;
        prefixes.add(Route::V1ActivityCollectionByDataSet, &[owner, dataset])?;
        prefixes.add(Route::V1DataSetInstanceByUser1, &[owner, dataset])?;
        prefixes.add(Route::V1DataSetCollectionByUser1, &[owner])?;
        prefixes.add(Route::V1PlaceCollectionByDataSet1, &[owner, dataset])?;
        prefixes.add(Route::V1AllSubmissionsByDataSet1, &[owner, dataset, ALL_SUBMISSIONS])?;
        prefixes.add(Route::V1ActivityCollectionByDataSet1, &[owner, dataset])?;
        let mut prefixes = prefixes.finish();
        prefixes.insert(Self::responses_prefix(owner, dataset));
        Ok(prefixes)
    }
}
