use super::*;
use crate::{
    requester::{Requester, PLACES},
    serializers::{Detail, Serializer},
};
use serde_json::Value;

/// Index a blob attribute of all things in a dataset.
pub fn add_index(
    connections: &sqlite::Connections,
    owner: &str,
    slug: &str,
    attr_name: &str,
) -> Result<DataIndex> {
    Ok(connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        usecases::add_data_index(conn, dataset.id.as_str(), attr_name)
    })?)
}

pub fn remove_index(
    connections: &sqlite::Connections,
    owner: &str,
    slug: &str,
    attr_name: &str,
) -> Result<DataIndex> {
    Ok(connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let index = conn
            .data_indexes_of_dataset(dataset.id.as_str())?
            .into_iter()
            .find(|index| index.attr_name == attr_name)
            .ok_or(RepoError::NotFound)?;
        usecases::remove_data_index(conn, index.id.as_str())
    })?)
}

/// The places whose indexed attribute has the given value.
pub fn filter_places(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    attr_name: &str,
    value: &Value,
    detail: Detail,
) -> Result<Vec<Value>> {
    let db = backend.connections.shared()?;
    let dataset = load_dataset(&db, owner, slug)?;
    requester.require(&db, DataAction::Retrieve, &dataset, PLACES)?;
    let detail = crate::reads::restrict(requester, &dataset, detail);
    let serializer = Serializer::new(&db, backend.cache, backend.base_url, requester, detail);
    let mut places = vec![];
    for thing in usecases::filter_by_index(&db, dataset.id.as_str(), attr_name, value)? {
        if !(thing.visible || detail.include_invisible) {
            continue;
        }
        let place = match db.get_place(thing.id.as_str()) {
            Ok(place) => place,
            // Submissions are indexed, too
            Err(RepoError::NotFound) => continue,
            Err(err) => return Err(err.into()),
        };
        places.push(serializer.place(&dataset, &place)?);
    }
    Ok(places)
}
