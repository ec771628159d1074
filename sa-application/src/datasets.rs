use super::*;
use crate::invalidate::{self, DataSetContents};

pub fn create_user(connections: &sqlite::Connections, username: &str) -> Result<User> {
    Ok(connections
        .exclusive()?
        .transaction(|conn| usecases::create_user(conn, username))?)
}

pub fn create_dataset(
    connections: &sqlite::Connections,
    owner: &str,
    new_dataset: usecases::NewDataSet,
) -> Result<DataSet> {
    Ok(connections.exclusive()?.transaction(|conn| {
        let owner = conn.get_user_by_username(owner)?;
        usecases::create_dataset(conn, &owner, new_dataset)
    })?)
}

pub fn update_dataset(
    backend: &Backend,
    owner: &str,
    slug: &str,
    display_name: String,
) -> Result<DataSet> {
    let dataset = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        usecases::update_dataset(conn, dataset.id.as_str(), display_name)
    })?;
    invalidate::dataset_changed(&backend.cache, &dataset);
    Ok(dataset)
}

/// Delete a dataset with all places, submissions and rules.
pub fn delete_dataset(backend: &Backend, owner: &str, slug: &str) -> Result<DataSet> {
    let keys = backend.cache;
    let (dataset, contents) = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let contents = DataSetContents::load(conn, dataset.id.as_str())?;
        contents.remember(&keys, conn);
        let dataset = usecases::delete_dataset(conn, dataset.id.as_str())?;
        Ok::<_, usecases::Error>((dataset, contents))
    })?;
    let db = backend.connections.shared()?;
    invalidate::dataset_contents_changed(&keys, &db, &dataset, &contents);
    Ok(dataset)
}
