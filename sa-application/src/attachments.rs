use super::*;
use crate::{
    invalidate::{self, Changed},
    requester::{Requester, PLACES},
};

/// The thing that owns an attachment.
#[derive(Debug, Clone)]
enum AttachedTo {
    Place(Place),
    Submission(SubmissionSet, Submission),
}

impl AttachedTo {
    fn load<R: Db>(repo: &R, thing_id: &str) -> std::result::Result<Self, RepoError> {
        let (_, kind) = repo.get_thing(thing_id)?;
        Ok(match kind {
            ThingKind::Place => Self::Place(repo.get_place(thing_id)?),
            ThingKind::Submission => {
                let submission = repo.get_submission(thing_id)?;
                let set = repo.get_submission_set(submission.parent_id.as_str())?;
                Self::Submission(set, submission)
            }
        })
    }

    fn set_name(&self) -> &str {
        match self {
            Self::Place(_) => PLACES,
            Self::Submission(set, _) => &set.name,
        }
    }

    fn changed(&self) -> Changed<'_> {
        match self {
            Self::Place(place) => Changed::Place(place),
            Self::Submission(_, submission) => Changed::Submission(submission),
        }
    }
}

/// Attach a file to a place or submission.
///
/// Attaching requires the permission to update the thing.
pub fn add_attachment(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    new_attachment: usecases::NewAttachment,
) -> Result<Attachment> {
    let (attachment, attached_to) = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let attached_to = AttachedTo::load(conn, new_attachment.thing_id.as_str())?;
        requester.require(conn, DataAction::Update, &dataset, attached_to.set_name())?;
        let attachment = usecases::add_attachment(conn, &dataset, new_attachment)?;
        Ok::<_, usecases::Error>((attachment, attached_to))
    })?;
    let db = backend.connections.shared()?;
    invalidate::attachment_changed(&backend.cache, &db, &attachment, attached_to.changed());
    Ok(attachment)
}

pub fn delete_attachment(
    backend: &Backend,
    requester: &Requester,
    owner: &str,
    slug: &str,
    id: &str,
) -> Result<Attachment> {
    let keys = backend.cache;
    let (attachment, attached_to) = backend.connections.exclusive()?.transaction(|conn| {
        let dataset = conn.get_dataset_by_slug(owner, slug)?;
        let attachment = conn.get_attachment(id)?;
        let attached_to = AttachedTo::load(conn, attachment.thing_id.as_str())?;
        if attached_to.changed().dataset_id() != &dataset.id {
            return Err(usecases::Error::from(RepoError::NotFound));
        }
        requester.require(conn, DataAction::Update, &dataset, attached_to.set_name())?;
        invalidate::remember_attachment(&keys, conn, &attachment);
        let attachment = usecases::delete_attachment(conn, id)?;
        Ok::<_, usecases::Error>((attachment, attached_to))
    })?;
    let db = backend.connections.shared()?;
    invalidate::attachment_changed(&keys, &db, &attachment, attached_to.changed());
    Ok(attachment)
}
