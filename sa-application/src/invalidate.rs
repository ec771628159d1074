//! Clearing cached data after a committed write.
//!
//! Failures are only logged: the write itself already succeeded
//! and stale entries expire on their own.

use super::*;
use sa_core::cache::{
    self, ActivityCache, AttachmentCache, CacheKeys, DataSetCache, ParentLoader, PlaceCache,
    SubmissionCache, ThingCache,
};
use std::collections::BTreeSet;

/// A thing whose cached representations are outdated.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Changed<'a> {
    Place(&'a Place),
    Submission(&'a Submission),
}

impl Changed<'_> {
    pub fn dataset_id(&self) -> &Id {
        match self {
            Self::Place(place) => &place.thing.dataset_id,
            Self::Submission(submission) => &submission.thing.dataset_id,
        }
    }
}

fn log_failure(what: impl std::fmt::Display, res: cache::Result<()>) {
    if let Err(err) = res {
        error!("Failed to clear cached data of {what}: {err}");
    }
}

/// Memoize the instance parameters while the parents still exist.
pub(crate) fn remember(keys: &CacheKeys, parents: &dyn ParentLoader, changed: Changed) {
    let res = match changed {
        Changed::Place(place) => keys.instance_params(&PlaceCache::new(parents), place),
        Changed::Submission(submission) => {
            keys.instance_params(&SubmissionCache::new(parents), submission)
        }
    };
    if let Err(err) = res {
        warn!("Failed to memoize instance parameters: {err}");
    }
}

pub(crate) fn remember_attachment(
    keys: &CacheKeys,
    parents: &dyn ParentLoader,
    attachment: &Attachment,
) {
    if let Err(err) = keys.instance_params(&AttachmentCache::new(parents), attachment) {
        warn!("Failed to memoize instance parameters: {err}");
    }
}

/// `recorded` is set when the activity stream changed.
pub(crate) fn thing_changed(
    keys: &CacheKeys,
    parents: &dyn ParentLoader,
    changed: Changed,
    recorded: bool,
) {
    match changed {
        Changed::Place(place) => log_failure(
            format_args!("place {}", place.id()),
            keys.clear_instance(&PlaceCache::new(parents), place),
        ),
        Changed::Submission(submission) => log_failure(
            format_args!("submission {}", submission.id()),
            keys.clear_instance(&SubmissionCache::new(parents), submission),
        ),
    }
    if recorded {
        log_failure("activity", ActivityCache::clear(keys));
    }
}

pub(crate) fn attachment_changed(
    keys: &CacheKeys,
    parents: &dyn ParentLoader,
    attachment: &Attachment,
    owner: Changed,
) {
    log_failure(
        format_args!("attachment {}", attachment.id),
        keys.clear_instance(&AttachmentCache::new(parents), attachment),
    );
    thing_changed(keys, parents, owner, true);
}

pub(crate) fn dataset_changed(keys: &CacheKeys, dataset: &DataSet) {
    log_failure(
        format_args!("dataset {}", dataset.id),
        keys.clear_instance(&DataSetCache, dataset),
    );
}

/// Everything of a dataset that might be cached.
#[derive(Debug, Default)]
pub(crate) struct DataSetContents {
    pub places: Vec<Place>,
    pub submissions: Vec<Submission>,
}

impl DataSetContents {
    pub fn load<R: Db>(repo: &R, dataset_id: &str) -> std::result::Result<Self, RepoError> {
        Ok(Self {
            places: repo.places_of_dataset(dataset_id)?,
            submissions: repo
                .submissions_of_dataset(dataset_id, None)?
                .into_iter()
                .map(|(_, submission)| submission)
                .collect(),
        })
    }

    pub fn of_place<R: Db>(repo: &R, place: Place) -> std::result::Result<Self, RepoError> {
        let mut submissions = vec![];
        for set in repo.submission_sets_of_place(place.id().as_str())? {
            submissions.extend(repo.submissions_of_set(set.id.as_str())?);
        }
        Ok(Self {
            places: vec![place],
            submissions,
        })
    }

    pub fn remember(&self, keys: &CacheKeys, parents: &dyn ParentLoader) {
        for place in &self.places {
            remember(keys, parents, Changed::Place(place));
        }
        for submission in &self.submissions {
            remember(keys, parents, Changed::Submission(submission));
        }
    }

    pub fn changed(&self, keys: &CacheKeys, parents: &dyn ParentLoader) {
        for place in &self.places {
            thing_changed(keys, parents, Changed::Place(place), false);
        }
        for submission in &self.submissions {
            thing_changed(keys, parents, Changed::Submission(submission), false);
        }
        log_failure("activity", ActivityCache::clear(keys));
    }
}

pub(crate) fn dataset_contents_changed(
    keys: &CacheKeys,
    parents: &dyn ParentLoader,
    dataset: &DataSet,
    contents: &DataSetContents,
) {
    dataset_changed(keys, dataset);
    contents.changed(keys, parents);
    let aggregates: BTreeSet<_> = [ThingCache::attachments_key(dataset.id.as_str())].into();
    log_failure(
        format_args!("attachments of dataset {}", dataset.id),
        keys.clear_keys(&aggregates),
    );
}

/// Drop every cached response of a dataset, e.g. after its
/// permission rules have changed.
pub fn invalidate_dataset(backend: &Backend, owner: &str, slug: &str) -> Result<()> {
    let db = backend.connections.shared()?;
    let dataset = load_dataset(&db, owner, slug)?;
    let contents = DataSetContents::load(&db, dataset.id.as_str())?;
    info!(
        "Invalidating dataset '{slug}' of '{owner}' with {} places and {} submissions",
        contents.places.len(),
        contents.submissions.len()
    );
    dataset_contents_changed(&backend.cache, &db, &dataset, &contents);
    Ok(())
}
