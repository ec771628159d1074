use super::*;

/// The general name under which all submissions of a place
/// or dataset are listed, regardless of their set.
pub const ALL_SUBMISSIONS: &str = "submissions";

#[derive(Clone, Copy)]
pub struct SubmissionCache<'r> {
    parents: &'r dyn ParentLoader,
}

impl<'r> SubmissionCache<'r> {
    pub fn new(parents: &'r dyn ParentLoader) -> Self {
        Self { parents }
    }
}

impl std::fmt::Debug for SubmissionCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("SubmissionCache").finish_non_exhaustive()
    }
}

impl EntityCache for SubmissionCache<'_> {
    type Entity = Submission;

    const NAME: &'static str = "SubmissionCache";

    fn instance_id(submission: &Submission) -> &str {
        submission.id().as_str()
    }

    fn derive_instance_params(
        &self,
        keys: &CacheKeys,
        submission: &Submission,
    ) -> Result<InstanceParams> {
        let set_id = submission.parent_id.as_str();
        let set_cache = SubmissionSetCache::new(self.parents);
        let params = keys.instance_params_by_id(&set_cache, set_id, || {
            self.parents.load_submission_set(set_id)
        })?;
        Ok(InstanceParams {
            submission: Some(submission.id().to_string()),
            ..params
        })
    }

    fn list_prefixes(&self, params: &InstanceParams) -> Result<BTreeSet<String>> {
        let (owner, dataset) = (params.owner.as_str(), params.dataset.as_str());
        let place = params.place()?;
        let set_name = params.set_name()?;
        let submission = params.submission()?;
        let mut prefixes = Prefixes::default();
        for set in [set_name, ALL_SUBMISSIONS] {
            prefixes.add(Route::SubmissionDetail, &[owner, dataset, place, set, submission])?;
            prefixes.add(Route::SubmissionList, &[owner, dataset, place, set])?;
            prefixes.add(Route::DataSetSubmissionList, &[owner, dataset, set])?;
        }
        prefixes.add(Route::PlaceDetail, &[owner, dataset, place])?;
        prefixes.add(Route::PlaceList, &[owner, dataset])?;
        prefixes.add(Route::DataSetDetail, &[owner, dataset])?;
        prefixes.add(Route::DataSetList, &[owner])?;
        prefixes.add(Route::ActionList, &[owner, dataset])?;
        if params.point {
            for set in [set_name, ALL_SUBMISSIONS] {
                let instance_args = [owner, dataset, place, set, submission];
                let collection_args = [owner, dataset, place, set];
                let all_args = [owner, dataset, set];
                prefixes.add(Route::V1SubmissionInstanceByDataSet, &instance_args)?;
                prefixes.add(Route::V1SubmissionCollectionByDataSet, &collection_args)?;
                prefixes.add(Route::V1TabularSubmissionCollectionByDataSet, &collection_args)?;
                prefixes.add(Route::V1AllSubmissionsByDataSet, &all_args)?;
                prefixes.add(Route::V1TabularAllSubmissionsByDataSet, &all_args)?;
                prefixes.add(Route::V1SubmissionInstanceByDataSet1, &instance_args)?;
                prefixes.add(Route::V1SubmissionCollectionByDataSet1, &collection_args)?;
                prefixes.add(Route::V1AllSubmissionsByDataSet1, &all_args)?;
            }
            prefixes.add(Route::V1PlaceInstanceByDataSet, &[owner, dataset, place])?;
            prefixes.add(Route::V1PlaceCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1TabularPlaceCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1DataSetInstanceByUser, &[owner, dataset])?;
            prefixes.add(Route::V1DataSetCollectionByUser, &[owner])?;
            prefixes.add(Route::V1ActivityCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1DataSetInstanceByUser1, &[owner, dataset])?;
            prefixes.add(Route::V1ActivityCollectionByDataSet1, &[owner, dataset])?;
        }
        Ok(prefixes.finish())
    }

    /// The aggregates of submission sets per dataset and per place.
    fn list_other_keys(
        &self,
        keys: &CacheKeys,
        params: &InstanceParams,
    ) -> Result<BTreeSet<String>> {
        let mut other_keys = DataSetCache::submission_sets_keys(keys, &params.owner_id)?;
        other_keys.extend(PlaceCache::submission_sets_keys(keys, &params.dataset_id)?);
        Ok(other_keys)
    }
}
