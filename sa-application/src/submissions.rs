use super::*;
use crate::{
    invalidate::{self, Changed},
    requester::Requester,
};

pub fn create_submission(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    new_submission: usecases::NewSubmission,
    opts: &usecases::StoreOptions,
) -> Result<usecases::StoredSubmission> {
    let stored = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        requester.require(
            conn,
            DataAction::Create,
            &dataset,
            new_submission.set_name.as_str(),
        )?;
        usecases::store_new_submission(
            conn,
            &dataset,
            requester.user.as_ref(),
            new_submission,
            opts,
        )
    })?;
    if stored.new_set {
        debug!(
            "Created submission set '{}' of place {}",
            stored.set.name, stored.set.place_id
        );
    }
    let db = backend.connections.shared()?;
    invalidate::thing_changed(
        &backend.cache,
        &db,
        Changed::Submission(&stored.submission),
        !opts.silent,
    );
    Ok(stored)
}

pub fn update_submission(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    update: usecases::UpdateSubmission,
    opts: &usecases::StoreOptions,
) -> Result<Submission> {
    let submission = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let existing = conn.get_submission(update.id.as_str())?;
        let set = conn.get_submission_set(existing.parent_id.as_str())?;
        requester.require(conn, DataAction::Update, &dataset, &set)?;
        usecases::store_updated_submission(conn, &dataset, update, opts)
    })?;
    let db = backend.connections.shared()?;
    invalidate::thing_changed(
        &backend.cache,
        &db,
        Changed::Submission(&submission),
        !opts.silent,
    );
    Ok(submission)
}

pub fn delete_submission(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    id: &str,
) -> Result<Submission> {
    let keys = backend.cache;
    let submission = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let submission = conn.get_submission(id)?;
        let set = conn.get_submission_set(submission.parent_id.as_str())?;
        requester.require(conn, DataAction::Destroy, &dataset, &set)?;
        invalidate::remember(&keys, conn, Changed::Submission(&submission));
        usecases::delete_thing(conn, &dataset, id)?;
        Ok::<_, usecases::Error>(submission)
    })?;
    let db = backend.connections.shared()?;
    invalidate::thing_changed(&keys, &db, Changed::Submission(&submission), true);
    Ok(submission)
}
