//! Cache-key derivation and invalidation.
//!
//! Responses are cached under keys that start with a URL path
//! (the *prefix*). Each prefix has a *meta key* that tracks every
//! concrete key that has been produced for it, because the cache
//! store cannot delete by prefix.
//!
//! Every entity kind knows how to derive its identifying
//! *instance parameters* (owner, dataset slug, place id, ...).
//! The parameters are memoized in the cache, so that the keys of
//! an instance can be reconstructed after the instance or one of
//! its parents has been deleted. If the memo has expired in the
//! meantime the invalidation remains incomplete and the stale
//! entries live until their own timeout.

use crate::{
    entities::*,
    repositories::{DataSetRepo, Error as RepoError, PlaceRepo, SubmissionSetRepo, ThingRepo},
    routes::{reverse, ReverseError, Route},
};
use anyhow::Result as Fallible;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{collections::BTreeSet, time::Duration};
use thiserror::Error;

mod activity;
mod attachment;
mod dataset;
mod place;
mod submission;
mod submission_set;
mod thing;

pub use self::{
    activity::*, attachment::*, dataset::*, place::*, submission::*, submission_set::*, thing::*,
};

/// A shared key-value store with expiring entries.
pub trait CacheStore {
    fn get(&self, key: &str) -> Fallible<Option<Value>>;
    fn set(&self, key: &str, value: Value, timeout: Duration) -> Fallible<()>;
    fn delete(&self, key: &str) -> Fallible<()>;
    fn delete_many(&self, keys: &[String]) -> Fallible<()>;
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Route(#[from] ReverseError),
    #[error("Missing instance parameter '{0}'")]
    MissingParam(&'static str),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Identifying attributes of an instance and its parents.
#[rustfmt::skip]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceParams {
    pub owner         : String,
    pub owner_id      : String,
    pub dataset       : String,
    pub dataset_id    : String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thing         : Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place         : Option<String>,
    /// Only places with a point geometry are served by the v1 API
    #[serde(default)]
    pub point         : bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name      : Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission    : Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment    : Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_id : Option<String>,
}

impl InstanceParams {
    pub fn place(&self) -> Result<&str> {
        required(&self.place, "place")
    }

    pub fn set_name(&self) -> Result<&str> {
        required(&self.set_name, "set_name")
    }

    pub fn submission(&self) -> Result<&str> {
        required(&self.submission, "submission")
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str> {
    value.as_deref().ok_or(Error::MissingParam(name))
}

/// Loads the parents of an instance when their parameters
/// are not memoized.
pub trait ParentLoader {
    fn load_dataset(&self, id: &str) -> std::result::Result<DataSet, RepoError>;
    fn load_thing(&self, id: &str) -> std::result::Result<Thing, RepoError>;
    fn load_place(&self, id: &str) -> std::result::Result<Place, RepoError>;
    fn load_submission_set(&self, id: &str) -> std::result::Result<SubmissionSet, RepoError>;
}

impl<R> ParentLoader for R
where
    R: DataSetRepo + ThingRepo + PlaceRepo + SubmissionSetRepo,
{
    fn load_dataset(&self, id: &str) -> std::result::Result<DataSet, RepoError> {
        self.get_dataset(id)
    }
    fn load_thing(&self, id: &str) -> std::result::Result<Thing, RepoError> {
        self.get_thing(id).map(|(thing, _)| thing)
    }
    fn load_place(&self, id: &str) -> std::result::Result<Place, RepoError> {
        self.get_place(id)
    }
    fn load_submission_set(&self, id: &str) -> std::result::Result<SubmissionSet, RepoError> {
        self.get_submission_set(id)
    }
}

/// The capabilities of one entity kind.
pub trait EntityCache {
    type Entity;

    /// Namespace of the memoized instance parameters.
    const NAME: &'static str;

    fn instance_id(entity: &Self::Entity) -> &str;

    fn derive_instance_params(
        &self,
        keys: &CacheKeys,
        entity: &Self::Entity,
    ) -> Result<InstanceParams>;

    /// URL paths of all cached responses that embed the instance.
    fn list_prefixes(&self, params: &InstanceParams) -> Result<BTreeSet<String>>;

    /// Additional keys that are not tracked by any prefix.
    fn list_other_keys(
        &self,
        _keys: &CacheKeys,
        _params: &InstanceParams,
    ) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}

#[derive(Debug, Default)]
pub(crate) struct Prefixes(BTreeSet<String>);

impl Prefixes {
    pub fn add(&mut self, route: Route, args: &[&str]) -> Result<()> {
        self.0.insert(reverse(route, args)?);
        Ok(())
    }

    pub fn finish(self) -> BTreeSet<String> {
        self.0
    }
}

/// Bookkeeping that is shared by all entity kinds.
#[derive(Clone, Copy)]
pub struct CacheKeys<'a> {
    store: &'a dyn CacheStore,
    timeout: Duration,
}

impl std::fmt::Debug for CacheKeys<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("CacheKeys")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<'a> CacheKeys<'a> {
    pub fn new(store: &'a dyn CacheStore, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn meta_key(prefix: &str) -> String {
        format!("{prefix}_keys")
    }

    pub fn instance_params_key(name: &str, id: &str) -> String {
        format!("{name}:v1:{id}")
    }

    /// Append `k=v` pairs to a key, e.g. for variants of an aggregate.
    pub fn key_with_params(prefix: &str, params: &[(&str, &str)]) -> String {
        if params.is_empty() {
            return prefix.to_string();
        }
        let params = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");
        format!("{prefix}:{params}")
    }

    fn tracked_keys(&self, meta_key: &str) -> Result<BTreeSet<String>> {
        match self.store.get(meta_key)? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(BTreeSet::new()),
        }
    }

    /// All keys registered for the given prefixes including the meta keys.
    pub fn keys_with_prefixes<'p>(
        &self,
        prefixes: impl IntoIterator<Item = &'p String>,
    ) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        for prefix in prefixes {
            let meta_key = Self::meta_key(prefix);
            keys.extend(self.tracked_keys(&meta_key)?);
            keys.insert(meta_key);
        }
        log::debug!("Keys with prefixes: {keys:?}");
        Ok(keys)
    }

    /// Track a concrete key under the meta key of its prefix.
    pub fn register_key(&self, prefix: &str, key: &str) -> Result<()> {
        let meta_key = Self::meta_key(prefix);
        let mut keys = self.tracked_keys(&meta_key)?;
        if keys.insert(key.to_string()) {
            self.store
                .set(&meta_key, serde_json::to_value(&keys)?, self.timeout)?;
        }
        Ok(())
    }

    pub fn clear_keys(&self, keys: &BTreeSet<String>) -> Result<()> {
        log::debug!("Deleting: {keys:?}");
        let keys: Vec<_> = keys.iter().cloned().collect();
        self.store.delete_many(&keys)?;
        Ok(())
    }

    /// Clear every key below one prefix.
    pub fn clear_prefix(&self, prefix: &str) -> Result<()> {
        let keys = self.keys_with_prefixes([&prefix.to_string()])?;
        self.clear_keys(&keys)
    }

    fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(cached) => Ok(Some(cached)),
            Err(err) => {
                log::warn!("Ignoring malformed cache entry {key}: {err}");
                Ok(None)
            }
        }
    }

    fn set_cached<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store
            .set(key, serde_json::to_value(value)?, self.timeout)?;
        Ok(())
    }

    /// Look up a value and compute it on a miss.
    pub fn get_or_compute<T, E, F>(&self, key: &str, compute: F) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        if let Some(cached) = self.get_cached(key)? {
            return Ok(cached);
        }
        let value = compute()?;
        self.set_cached(key, &value)?;
        Ok(value)
    }

    /// Like [`Self::get_or_compute`], but the key is tracked by
    /// the given prefix and disappears when the prefix is cleared.
    pub fn cached_response<T, E, F>(
        &self,
        prefix: &str,
        key: &str,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> std::result::Result<T, E>,
        E: From<Error>,
    {
        if let Some(cached) = self.get_cached(key)? {
            log::debug!("Cache hit: {key}");
            return Ok(cached);
        }
        let value = compute()?;
        self.set_cached(key, &value)?;
        self.register_key(prefix, key)?;
        Ok(value)
    }

    fn memoize_params<F>(&self, key: &str, derive: F) -> Result<InstanceParams>
    where
        F: FnOnce() -> Result<InstanceParams>,
    {
        if let Some(params) = self.get_cached(key)? {
            log::debug!("Found instance parameters for {key}: {params:?}");
            return Ok(params);
        }
        let params = derive()?;
        log::debug!("Setting instance parameters for {key}: {params:?}");
        self.set_cached(key, &params)?;
        Ok(params)
    }

    /// The memoized parameters of a live instance.
    pub fn instance_params<C: EntityCache>(
        &self,
        cache: &C,
        entity: &C::Entity,
    ) -> Result<InstanceParams> {
        let key = Self::instance_params_key(C::NAME, C::instance_id(entity));
        self.memoize_params(&key, || cache.derive_instance_params(self, entity))
    }

    /// The memoized parameters of an instance that is only
    /// loaded on a miss.
    pub fn instance_params_by_id<C, F>(
        &self,
        cache: &C,
        id: &str,
        load: F,
    ) -> Result<InstanceParams>
    where
        C: EntityCache,
        F: FnOnce() -> std::result::Result<C::Entity, RepoError>,
    {
        let key = Self::instance_params_key(C::NAME, id);
        self.memoize_params(&key, || {
            let entity = load()?;
            cache.derive_instance_params(self, &entity)
        })
    }

    /// Delete all cached data that depends on the instance.
    pub fn clear_instance<C: EntityCache>(&self, cache: &C, entity: &C::Entity) -> Result<()> {
        let params_key = Self::instance_params_key(C::NAME, C::instance_id(entity));
        let mut keys = BTreeSet::new();
        match self.instance_params(cache, entity) {
            Ok(params) => {
                let prefixes = cache.list_prefixes(&params)?;
                keys.extend(self.keys_with_prefixes(&prefixes)?);
                keys.extend(cache.list_other_keys(self, &params)?);
            }
            Err(Error::Repo(RepoError::NotFound)) => {
                log::warn!(
                    "Incomplete invalidation of {params_key}: the parameters of a parent have expired and the parent is gone"
                );
            }
            Err(err) => return Err(err),
        }
        keys.insert(params_key);
        self.clear_keys(&keys)
    }
}
