use super::{indexing::index_thing, prelude::*};
use crate::{
    blob::{DataBlobProcessor, RestoredFields},
    util::validate,
};
use serde_json::{Map, Value};

/// How a write is recorded.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Skip the activity log
    pub silent: bool,
    /// Origin of the request, e.g. the referer
    pub source: Option<String>,
    pub reindex: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            silent: false,
            source: None,
            reindex: true,
        }
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct NewPlace {
    /// WKT string or GeoJSON object
    pub geometry  : Value,
    pub visible   : bool,
    pub submitter : Option<Id>,
    pub data      : Map<String, Value>,
}

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct UpdatePlace {
    pub id        : Id,
    pub geometry  : Option<Value>,
    pub visible   : Option<bool>,
    pub submitter : Option<Id>,
    /// Replaces the stored blob
    pub data      : Map<String, Value>,
}

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub place_id  : Id,
    pub set_name  : String,
    pub visible   : bool,
    pub submitter : Option<Id>,
    pub data      : Map<String, Value>,
}

#[rustfmt::skip]
#[derive(Debug, Clone)]
pub struct UpdateSubmission {
    pub id        : Id,
    pub visible   : Option<bool>,
    pub submitter : Option<Id>,
    pub data      : Map<String, Value>,
}

fn visible(fields: &Map<String, Value>) -> Option<bool> {
    fields.get("visible").and_then(Value::as_bool)
}

fn present(fields: &mut Map<String, Value>, name: &str) -> Option<Value> {
    fields.remove(name).filter(|value| !value.is_null())
}

// Submitters come from the requester, never from a representation.

impl NewPlace {
    /// Split a JSON representation into the declared fields and the blob.
    pub fn from_representation(representation: Map<String, Value>) -> Self {
        let RestoredFields { mut fields, blob } =
            DataBlobProcessor::for_places().restore(representation, false);
        Self {
            geometry: fields.remove("geometry").unwrap_or_default(),
            visible: visible(&fields).unwrap_or(true),
            submitter: None,
            data: blob,
        }
    }
}

impl UpdatePlace {
    pub fn from_representation(id: Id, representation: Map<String, Value>, partial: bool) -> Self {
        let RestoredFields { mut fields, blob } =
            DataBlobProcessor::for_places().restore(representation, partial);
        Self {
            id,
            geometry: present(&mut fields, "geometry"),
            visible: visible(&fields),
            submitter: None,
            data: blob,
        }
    }
}

impl NewSubmission {
    pub fn from_representation(
        place_id: Id,
        set_name: String,
        representation: Map<String, Value>,
    ) -> Self {
        let RestoredFields { fields, blob } =
            DataBlobProcessor::for_submissions().restore(representation, false);
        Self {
            place_id,
            set_name,
            visible: visible(&fields).unwrap_or(true),
            submitter: None,
            data: blob,
        }
    }
}

impl UpdateSubmission {
    pub fn from_representation(id: Id, representation: Map<String, Value>, partial: bool) -> Self {
        let RestoredFields { fields, blob } =
            DataBlobProcessor::for_submissions().restore(representation, partial);
        Self {
            id,
            visible: visible(&fields),
            submitter: None,
            data: blob,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredSubmission {
    pub set: SubmissionSet,
    pub submission: Submission,
    /// The set did not exist before
    pub new_set: bool,
}

#[derive(Debug, Clone)]
pub enum DeletedThing {
    Place(Place),
    Submission(SubmissionSet, Submission),
}

fn new_thing(dataset: &DataSet, actor: Option<&User>, submitter: Option<Id>) -> Thing {
    let now = Timestamp::now();
    Thing {
        id: Id::new(),
        dataset_id: dataset.id.clone(),
        submitter_id: submitter.or_else(|| actor.map(|u| u.id.clone())),
        data: DataBlob::default(),
        visible: true,
        created_at: now,
        updated_at: now,
    }
}

fn after_save<R>(repo: &R, thing: &Thing, action: ActionKind, opts: &StoreOptions) -> Result<()>
where
    R: DataIndexRepo + IndexedValueRepo + ActionRepo,
{
    if opts.reindex {
        index_thing(repo, thing)?;
    }
    if opts.silent {
        log::debug!("Not recording {action} of {} (silent)", thing.id);
        return Ok(());
    }
    repo.create_action(&Action {
        id: Id::new(),
        thing_id: thing.id.clone(),
        action,
        source: opts.source.clone(),
        created_at: Timestamp::now(),
    })?;
    Ok(())
}

fn ensure_same_dataset(dataset: &DataSet, thing: &Thing) -> Result<()> {
    if thing.dataset_id != dataset.id {
        // Things of other datasets do not exist from the
        // perspective of this dataset
        return Err(RepoError::NotFound.into());
    }
    Ok(())
}

pub fn store_new_place<R: Db>(
    repo: &R,
    dataset: &DataSet,
    actor: Option<&User>,
    new_place: NewPlace,
    opts: &StoreOptions,
) -> Result<Place> {
    let NewPlace {
        geometry,
        visible,
        submitter,
        data,
    } = new_place;
    let geometry = Geometry::from_json_value(&geometry)?;
    let mut thing = new_thing(dataset, actor, submitter);
    thing.visible = visible;
    thing.data = DataBlob::from(&data);
    let place = Place { thing, geometry };
    repo.create_place(&place)?;
    after_save(repo, &place.thing, ActionKind::Create, opts)?;
    log::info!("Created place {} in dataset {}", place.id(), dataset.id);
    Ok(place)
}

pub fn store_updated_place<R: Db>(
    repo: &R,
    dataset: &DataSet,
    update: UpdatePlace,
    opts: &StoreOptions,
) -> Result<Place> {
    let UpdatePlace {
        id,
        geometry,
        visible,
        submitter,
        data,
    } = update;
    let mut place = repo.get_place(id.as_str())?;
    ensure_same_dataset(dataset, &place.thing)?;
    if let Some(geometry) = geometry {
        place.geometry = Geometry::from_json_value(&geometry)?;
    }
    update_thing(&mut place.thing, visible, submitter, &data);
    repo.update_place(&place)?;
    after_save(repo, &place.thing, ActionKind::Update, opts)?;
    log::info!("Updated place {}", place.id());
    Ok(place)
}

fn update_thing(
    thing: &mut Thing,
    visible: Option<bool>,
    submitter: Option<Id>,
    data: &Map<String, Value>,
) {
    if let Some(visible) = visible {
        thing.visible = visible;
    }
    if submitter.is_some() {
        thing.submitter_id = submitter;
    }
    thing.data = DataBlob::from(data);
    thing.updated_at = Timestamp::now();
}

pub fn store_new_submission<R: Db>(
    repo: &R,
    dataset: &DataSet,
    actor: Option<&User>,
    new_submission: NewSubmission,
    opts: &StoreOptions,
) -> Result<StoredSubmission> {
    let NewSubmission {
        place_id,
        set_name,
        visible,
        submitter,
        data,
    } = new_submission;
    if !validate::is_valid_slug(&set_name) {
        return Err(Error::SubmissionSetName);
    }
    let place = repo.get_place(place_id.as_str())?;
    if place.thing.dataset_id != dataset.id {
        return Err(Error::PlaceNotInDataSet);
    }
    let (set, new_set) =
        match repo.try_get_submission_set_by_name(place_id.as_str(), &set_name)? {
            Some(set) => (set, false),
            None => {
                let set = SubmissionSet {
                    id: Id::new(),
                    place_id,
                    name: set_name,
                };
                repo.create_submission_set(&set)?;
                log::debug!("Created submission set '{}' of place {}", set.name, set.place_id);
                (set, true)
            }
        };
    let mut thing = new_thing(dataset, actor, submitter);
    thing.visible = visible;
    thing.data = DataBlob::from(&data);
    let submission = Submission {
        thing,
        parent_id: set.id.clone(),
    };
    repo.create_submission(&submission)?;
    after_save(repo, &submission.thing, ActionKind::Create, opts)?;
    log::info!(
        "Created submission {} in '{}' of place {}",
        submission.id(),
        set.name,
        set.place_id
    );
    Ok(StoredSubmission {
        set,
        submission,
        new_set,
    })
}

pub fn store_updated_submission<R: Db>(
    repo: &R,
    dataset: &DataSet,
    update: UpdateSubmission,
    opts: &StoreOptions,
) -> Result<Submission> {
    let UpdateSubmission {
        id,
        visible,
        submitter,
        data,
    } = update;
    let mut submission = repo.get_submission(id.as_str())?;
    ensure_same_dataset(dataset, &submission.thing)?;
    update_thing(&mut submission.thing, visible, submitter, &data);
    repo.update_submission(&submission)?;
    after_save(repo, &submission.thing, ActionKind::Update, opts)?;
    log::info!("Updated submission {}", submission.id());
    Ok(submission)
}

/// Delete a place (with all its submissions) or a submission.
///
/// The deleted entities are returned, because their cache
/// entries still need to be cleared.
pub fn delete_thing<R: Db>(repo: &R, dataset: &DataSet, id: &str) -> Result<DeletedThing> {
    let (thing, kind) = repo.get_thing(id)?;
    ensure_same_dataset(dataset, &thing)?;
    let deleted = match kind {
        ThingKind::Place => DeletedThing::Place(repo.get_place(id)?),
        ThingKind::Submission => {
            let submission = repo.get_submission(id)?;
            let set = repo.get_submission_set(submission.parent_id.as_str())?;
            DeletedThing::Submission(set, submission)
        }
    };
    repo.delete_thing(id)?;
    log::info!("Deleted {kind:?} {id} of dataset {}", dataset.id);
    Ok(deleted)
}
