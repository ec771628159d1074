use super::*;

#[derive(Clone, Copy)]
pub struct PlaceCache<'r> {
    parents: &'r dyn ParentLoader,
}

impl<'r> PlaceCache<'r> {
    pub fn new(parents: &'r dyn ParentLoader) -> Self {
        Self { parents }
    }

    pub fn submission_sets_key_prefix(dataset_id: &str) -> String {
        format!("dataset:v1:{dataset_id}:submission_sets-by-thing_id")
    }

    /// Keys of all submission set summaries of the dataset's places.
    pub fn submission_sets_keys(keys: &CacheKeys, dataset_id: &str) -> Result<BTreeSet<String>> {
        keys.keys_with_prefixes([&Self::submission_sets_key_prefix(dataset_id)])
    }

    /// A mapping from place ids to their submission set summaries.
    ///
    /// The summaries of all places in a dataset are calculated at
    /// once, which avoids one query per place when serializing a
    /// list of places.
    pub fn get_submission_sets<T, E, F>(
        keys: &CacheKeys,
        dataset_id: &str,
        params: &[(&str, &str)],
        calculate: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&str) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let prefix = Self::submission_sets_key_prefix(dataset_id);
        let key = CacheKeys::key_with_params(&prefix, params);
        keys.cached_response(&prefix, &key, || calculate(dataset_id))
    }
}

impl std::fmt::Debug for PlaceCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("PlaceCache").finish_non_exhaustive()
    }
}

impl EntityCache for PlaceCache<'_> {
    type Entity = Place;

    const NAME: &'static str = "PlaceCache";

    fn instance_id(place: &Place) -> &str {
        place.id().as_str()
    }

    fn derive_instance_params(&self, keys: &CacheKeys, place: &Place) -> Result<InstanceParams> {
        let dataset_id = place.thing.dataset_id.as_str();
        let params = keys.instance_params_by_id(&DataSetCache, dataset_id, || {
            self.parents.load_dataset(dataset_id)
        })?;
        Ok(InstanceParams {
            place: Some(place.id().to_string()),
            point: place.geometry.is_point(),
            ..params
        })
    }

    fn list_prefixes(&self, params: &InstanceParams) -> Result<BTreeSet<String>> {
        let (owner, dataset) = (params.owner.as_str(), params.dataset.as_str());
        let place = params.place()?;
        let mut prefixes = Prefixes::default();
        prefixes.add(Route::PlaceDetail, &[owner, dataset, place])?;
        prefixes.add(Route::PlaceList, &[owner, dataset])?;
        prefixes.add(Route::PlaceAttachmentList, &[owner, dataset, place])?;
        prefixes.add(Route::DataSetDetail, &[owner, dataset])?;
        prefixes.add(Route::DataSetList, &[owner])?;
        prefixes.add(Route::ActionList, &[owner, dataset])?;
        if params.point {
            prefixes.add(Route::V1PlaceInstanceByDataSet, &[owner, dataset, place])?;
            prefixes.add(Route::V1PlaceCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1TabularPlaceCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1ActivityCollectionByDataSet, &[owner, dataset])?;
            prefixes.add(Route::V1DataSetInstanceByUser, &[owner, dataset])?;
            prefixes.add(Route::V1DataSetCollectionByUser, &[owner])?;
            prefixes.add(Route::V1PlaceInstanceByDataSet1, &[owner, dataset, place])?;
            prefixes.add(Route::V1PlaceCollectionByDataSet1, &[owner, dataset])?;
            prefixes.add(Route::V1ActivityCollectionByDataSet1, &[owner, dataset])?;
        }
        Ok(prefixes.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cache::tests::*, usecases::tests::MockDb};
    use sa_entities::builders::*;

    #[test]
    fn point_places_emit_legacy_prefixes() {
        let db = MockDb::default();
        db.datasets.borrow_mut().push(dataset());
        let place = Place::build().id("p1").dataset("ds1").finish();
        let store = MemoryStore::default();
        let keys = store.keys();
        let cache = PlaceCache::new(&db);
        let params = keys.instance_params(&cache, &place).unwrap();
        assert!(params.point);
        let prefixes = cache.list_prefixes(&params).unwrap();
        assert!(prefixes.contains("/api/v2/alice/datasets/ds/places/p1"));
        assert!(prefixes.contains("/api/v1/alice/datasets/ds/places/p1/"));
        assert!(prefixes.contains("/api/v1/alice/datasets/ds/places/p1"));
        assert!(prefixes.contains("/api/v1/alice/datasets/ds/activity/"));
        assert!(prefixes.contains("/api/v1/alice/datasets/ds/places/table/"));
    }

    #[test]
    fn non_point_places_skip_legacy_prefixes() {
        let db = MockDb::default();
        db.datasets.borrow_mut().push(dataset());
        let place = Place::build()
            .id("p1")
            .dataset("ds1")
            .geometry("LINESTRING (0 0, 1 1)")
            .finish();
        let store = MemoryStore::default();
        let keys = store.keys();
        let cache = PlaceCache::new(&db);
        let params = keys.instance_params(&cache, &place).unwrap();
        assert!(!params.point);
        let prefixes = cache.list_prefixes(&params).unwrap();
        assert!(prefixes.contains("/api/v2/alice/datasets/ds/places/p1"));
        assert!(prefixes.iter().all(|p| !p.starts_with("/api/v1/")));
    }

    #[test]
    fn memoized_dataset_params_are_reused() {
        let db = MockDb::default();
        db.datasets.borrow_mut().push(dataset());
        let store = MemoryStore::default();
        let keys = store.keys();
        let cache = PlaceCache::new(&db);
        for id in ["p1", "p2", "p3"] {
            let place = Place::build().id(id).dataset("ds1").finish();
            keys.instance_params(&cache, &place).unwrap();
        }
        assert_eq!(1, db.dataset_loads.get());
    }

    #[test]
    fn clearing_a_place_clears_its_memo() {
        let db = MockDb::default();
        db.datasets.borrow_mut().push(dataset());
        let place = Place::build().id("p1").dataset("ds1").finish();
        let store = MemoryStore::default();
        let keys = store.keys();
        let cache = PlaceCache::new(&db);
        keys.instance_params(&cache, &place).unwrap();
        assert!(store.contains("PlaceCache:v1:p1"));
        keys.clear_instance(&cache, &place).unwrap();
        assert!(!store.contains("PlaceCache:v1:p1"));
        // The dataset parameters are still valid
        assert!(store.contains("DataSetCache:v1:ds1"));
    }

    #[test]
    fn clearing_a_place_of_a_vanished_dataset_is_incomplete_but_succeeds() {
        let db = MockDb::default();
        let place = Place::build().id("p1").dataset("gone").finish();
        let store = MemoryStore::default();
        let keys = store.keys();
        let key = "/api/v2/alice/datasets/ds/places/p1";
        keys.cached_response::<String, Error, _>(key, key, || Ok("cached".into()))
            .unwrap();
        keys.clear_instance(&PlaceCache::new(&db), &place).unwrap();
        // Without parameters the prefix cannot be reconstructed
        assert!(store.contains(key));
    }

    #[test]
    fn submission_sets_summary_is_computed_once() {
        let store = MemoryStore::default();
        let keys = store.keys();
        let mut calls = 0;
        for _ in 0..3 {
            PlaceCache::get_submission_sets::<_, Error, _>(&keys, "ds1", &[], |_| {
                calls += 1;
                Ok(vec!["comments".to_string()])
            })
            .unwrap();
        }
        assert_eq!(1, calls);
        let tracked = PlaceCache::submission_sets_keys(&keys, "ds1").unwrap();
        assert!(tracked.contains("dataset:v1:ds1:submission_sets-by-thing_id"));
    }
}
