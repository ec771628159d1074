use super::*;
use crate::{
    invalidate::{self, Changed, DataSetContents},
    requester::{Requester, PLACES},
};

pub fn create_place(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    new_place: usecases::NewPlace,
    opts: &usecases::StoreOptions,
) -> Result<Place> {
    let place = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        requester.require(conn, DataAction::Create, &dataset, PLACES)?;
        usecases::store_new_place(conn, &dataset, requester.user.as_ref(), new_place, opts)
    })?;
    let db = backend.connections.shared()?;
    invalidate::thing_changed(&backend.cache, &db, Changed::Place(&place), !opts.silent);
    Ok(place)
}

pub fn update_place(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    update: usecases::UpdatePlace,
    opts: &usecases::StoreOptions,
) -> Result<Place> {
    let place = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        requester.require(conn, DataAction::Update, &dataset, PLACES)?;
        usecases::store_updated_place(conn, &dataset, update, opts).map_err(|err| {
            warn!("Failed to store updated place: {err}");
            err
        })
    })?;
    let db = backend.connections.shared()?;
    invalidate::thing_changed(&backend.cache, &db, Changed::Place(&place), !opts.silent);
    Ok(place)
}

/// Delete a place together with its submissions.
pub fn delete_place(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    id: &str,
) -> Result<Place> {
    let keys = backend.cache;
    let contents = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        requester.require(conn, DataAction::Destroy, &dataset, PLACES)?;
        let contents = DataSetContents::of_place(conn, conn.get_place(id)?)?;
        // The parameters cannot be derived anymore once
        // the rows are gone.
        contents.remember(&keys, conn);
        usecases::delete_thing(conn, &dataset, id)?;
        Ok::<_, usecases::Error>(contents)
    })?;
    let db = backend.connections.shared()?;
    contents.changed(&keys, &db);
    contents
        .places
        .into_iter()
        .next()
        .ok_or_else(|| RepoError::NotFound.into())
}
