use super::*;

/// All activity responses are tracked under this prefix,
/// i.e. by the meta key `activity_keys`.
pub const ACTIVITY_PREFIX: &str = "activity";

/// Activity responses span whole datasets and are cleared
/// together whenever an action is recorded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivityCache;

impl ActivityCache {
    pub fn cached_activity<T, E, F>(
        keys: &CacheKeys,
        key: &str,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        keys.cached_response(ACTIVITY_PREFIX, key, compute)
    }

    pub fn clear(keys: &CacheKeys) -> Result<()> {
        keys.clear_prefix(ACTIVITY_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::*;

    #[test]
    fn clear_all_activity() {
        let store = MemoryStore::default();
        let keys = store.keys();
        for key in ["activity:ds1", "activity:ds2"] {
            ActivityCache::cached_activity::<_, Error, _>(&keys, key, || Ok(vec![1, 2])).unwrap();
        }
        assert!(store.contains("activity_keys"));
        ActivityCache::clear(&keys).unwrap();
        assert!(!store.contains("activity:ds1"));
        assert!(!store.contains("activity:ds2"));
        assert!(!store.contains("activity_keys"));
    }
}
