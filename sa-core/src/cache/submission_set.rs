use super::*;

/// A submission set only exists within a place, so its
/// invalidation covers the responses of the place.
#[derive(Clone, Copy)]
pub struct SubmissionSetCache<'r> {
    parents: &'r dyn ParentLoader,
}

impl<'r> SubmissionSetCache<'r> {
    pub fn new(parents: &'r dyn ParentLoader) -> Self {
        Self { parents }
    }
}

impl std::fmt::Debug for SubmissionSetCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SubmissionSetCache").finish_non_exhaustive()
    }
}

impl EntityCache for SubmissionSetCache<'_> {
    type Entity = SubmissionSet;

    const NAME: &'static str = "SubmissionSetCache";

    fn instance_id(set: &SubmissionSet) -> &str {
        set.id.as_str()
    }

    fn derive_instance_params(
        &self,
        keys: &CacheKeys,
        set: &SubmissionSet,
    ) -> Result<InstanceParams> {
        let place_id = set.place_id.as_str();
        let params = keys.instance_params_by_id(&PlaceCache::new(self.parents), place_id, || {
            self.parents.load_place(place_id)
        })?;
        Ok(InstanceParams {
            set_name: Some(set.name.clone()),
            ..params
        })
    }

    fn list_prefixes(&self, params: &InstanceParams) -> Result<BTreeSet<String>> {
        let (owner, dataset) = (params.owner.as_str(), params.dataset.as_str());
        let place = params.place()?;
        let set_name = params.set_name()?;
        let mut prefixes = Prefixes::default();
        prefixes.add(Route::PlaceDetail, &[owner, dataset, place])?;
        prefixes.add(Route::PlaceList, &[owner, dataset])?;
        prefixes.add(Route::DataSetDetail, &[owner, dataset])?;
        prefixes.add(Route::ActionList, &[owner, dataset])?;
        prefixes.add(Route::SubmissionList, &[owner, dataset, place, set_name])?;
        prefixes.add(Route::DataSetSubmissionList, &[owner, dataset, set_name])?;
        if params.point {
            prefixes.add(Route::V1PlaceInstanceByDataSet, &[owner, dataset, place])?;
            prefixes.add(Route::V1PlaceCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1TabularPlaceCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1DataSetInstanceByUser, &[owner, dataset])?;
            prefixes.add(Route::V1ActivityCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1PlaceInstanceByDataSet1, &[owner, dataset, place])?;
            prefixes.add(Route::V1PlaceCollectionByDataSet1, &[owner, dataset])?;
            prefixes.add(Route::V1DataSetInstanceByUser1, &[owner, dataset])?;
            prefixes.add(Route::V1ActivityCollectionByDataSet1, &[owner, dataset])?;
        }
        Ok(prefixes.finish())
    }
}
