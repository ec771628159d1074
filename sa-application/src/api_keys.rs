use super::*;
use crate::{
    requester::Requester,
    serializers::{self, Detail, Serializer},
};
use sa_boundary as json;
use serde_json::Value;

pub fn create_api_key(
    connections: &sqlite::Connections,
    owner: &str,
    slug: &str,
) -> Result<ApiKey> {
    Ok(connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        usecases::create_api_key(conn, dataset.id.as_str())
    })?)
}

/// The keys of a dataset, only visible with protected access.
pub fn api_keys_of_dataset(
    connections: &sqlite::Connections,
    requester: &Requester,
    owner: &str,
    slug: &str,
) -> Result<Vec<json::ApiKey>> {
    let db = connections.shared()?;
    let dataset = load_dataset(&db, owner, slug)?;
    if !requester.has_protected_access(&dataset) {
        return Err(usecases::Error::Forbidden.into());
    }
    Ok(db
        .api_keys_of_dataset(dataset.id.as_str())?
        .iter()
        .map(json::ApiKey::from)
        .collect())
}

pub fn log_in_api_key(connections: &sqlite::Connections, key: &str, ip: &str) -> Result<ApiKey> {
    Ok(connections
        .exclusive()?
        .transaction(|conn| usecases::log_in_api_key(conn, key, ip))?)
}

pub fn log_out_api_key(connections: &sqlite::Connections, key: &str) -> Result<ApiKey> {
    Ok(connections
        .exclusive()?
        .transaction(|conn| usecases::log_out_api_key(conn, key))?)
}

/// The serialized datasets of a key as a list.
pub fn datasets_of_api_key(backend: &Backend, key: &str) -> Result<Vec<Value>> {
    let db = backend.connections.shared()?;
    let api_key = usecases::get_api_key(&db, key)?;
    let requester = Requester::api_key(api_key);
    let serializer = Serializer::new(
        &db,
        backend.cache,
        backend.base_url,
        &requester,
        Detail::default(),
    );
    let mut datasets = vec![];
    if let Some(api_key) = &requester.api_key {
        for dataset in serializers::api_key_datasets(&db, api_key)? {
            datasets.push(serializer.dataset(&dataset)?);
        }
    }
    Ok(datasets)
}
