// Low-level database access traits.
// Each repository is responsible for a single entity and
// its relationships. Related entities are only referenced
// by their id and never modified or loaded by another
// repository.

use crate::entities::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error("The object already exists")]
    AlreadyExists,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

type Result<T> = std::result::Result<T, Error>;

pub trait UserRepo {
    fn create_user(&self, user: &User) -> Result<()>;
    fn update_user(&self, user: &User) -> Result<()>;

    fn get_user(&self, id: &str) -> Result<User>;
    fn get_user_by_username(&self, username: &str) -> Result<User>;
    fn all_users(&self) -> Result<Vec<User>>;
}

pub trait DataSetRepo {
    fn create_dataset(&self, dataset: &DataSet) -> Result<()>;
    fn update_dataset(&self, dataset: &DataSet) -> Result<()>;
    // Cascades to everything the dataset owns
    fn delete_dataset(&self, id: &str) -> Result<()>;

    fn get_dataset(&self, id: &str) -> Result<DataSet>;
    fn get_dataset_by_slug(&self, owner_username: &str, slug: &str) -> Result<DataSet>;
    fn datasets_of_owner(&self, owner_id: &str) -> Result<Vec<DataSet>>;
}

/// Operations that apply to places and submissions alike.
pub trait ThingRepo {
    fn get_thing(&self, id: &str) -> Result<(Thing, ThingKind)>;
    fn things_of_dataset(&self, dataset_id: &str) -> Result<Vec<Thing>>;

    // Cascades to indexed values, attachments and actions
    // and for places also to submission sets and submissions.
    fn delete_thing(&self, id: &str) -> Result<()>;
}

pub trait PlaceRepo {
    fn create_place(&self, place: &Place) -> Result<()>;
    fn update_place(&self, place: &Place) -> Result<()>;

    fn get_place(&self, id: &str) -> Result<Place>;
    fn places_of_dataset(&self, dataset_id: &str) -> Result<Vec<Place>>;
    fn count_places_of_dataset(&self, dataset_id: &str) -> Result<usize>;
}

pub trait SubmissionSetRepo {
    fn create_submission_set(&self, set: &SubmissionSet) -> Result<()>;

    fn get_submission_set(&self, id: &str) -> Result<SubmissionSet>;
    fn try_get_submission_set_by_name(
        &self,
        place_id: &str,
        name: &str,
    ) -> Result<Option<SubmissionSet>>;
    fn submission_sets_of_place(&self, place_id: &str) -> Result<Vec<SubmissionSet>>;
}

/// The number of visible submissions in one submission set.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSetCount {
    pub place_id : Id,
    pub set_name : String,
    pub length   : usize,
}

pub trait SubmissionRepo {
    fn create_submission(&self, submission: &Submission) -> Result<()>;
    fn update_submission(&self, submission: &Submission) -> Result<()>;

    fn get_submission(&self, id: &str) -> Result<Submission>;
    fn submissions_of_set(&self, set_id: &str) -> Result<Vec<Submission>>;
    // All submissions of a dataset, optionally restricted
    // to the sets with the given name.
    fn submissions_of_dataset(
        &self,
        dataset_id: &str,
        set_name: Option<&str>,
    ) -> Result<Vec<(SubmissionSet, Submission)>>;
    fn count_visible_submissions(&self, dataset_id: &str) -> Result<Vec<SubmissionSetCount>>;
}

pub trait AttachmentRepo {
    fn create_attachment(&self, attachment: &Attachment) -> Result<()>;
    fn delete_attachment(&self, id: &str) -> Result<()>;

    fn get_attachment(&self, id: &str) -> Result<Attachment>;
    fn attachments_of_thing(&self, thing_id: &str) -> Result<Vec<Attachment>>;
    fn attachments_of_dataset(&self, dataset_id: &str) -> Result<Vec<Attachment>>;
}

pub trait ActionRepo {
    fn create_action(&self, action: &Action) -> Result<()>;

    // Most recent first
    fn actions_of_dataset(&self, dataset_id: &str, limit: Option<usize>) -> Result<Vec<Action>>;
    fn actions_of_thing(&self, thing_id: &str) -> Result<Vec<Action>>;
}

pub trait DataIndexRepo {
    fn create_data_index(&self, index: &DataIndex) -> Result<()>;
    // Cascades to the indexed values
    fn delete_data_index(&self, id: &str) -> Result<()>;

    fn get_data_index(&self, id: &str) -> Result<DataIndex>;
    fn data_indexes_of_dataset(&self, dataset_id: &str) -> Result<Vec<DataIndex>>;
}

pub trait IndexedValueRepo {
    fn create_indexed_value(&self, value: &IndexedValue) -> Result<()>;
    fn update_indexed_value(&self, value: &IndexedValue) -> Result<()>;
    fn delete_indexed_value(&self, id: &str) -> Result<()>;

    fn indexed_values_of_thing(&self, thing_id: &str) -> Result<Vec<IndexedValue>>;
    fn indexed_values_of_index(&self, index_id: &str) -> Result<Vec<IndexedValue>>;
    fn thing_ids_by_indexed_value(&self, index_id: &str, value: &str) -> Result<Vec<Id>>;
}

pub trait PermissionRepo {
    fn create_permission(&self, scope: &PermissionScope, permission: &DataPermission)
        -> Result<()>;
    fn update_permission(&self, permission: &DataPermission) -> Result<()>;
    fn delete_permission(&self, id: &str) -> Result<()>;

    // Ordered by ascending priority
    fn permissions_of(&self, scope: &PermissionScope) -> Result<Vec<DataPermission>>;
}

pub trait ApiKeyRepo {
    fn create_api_key(&self, api_key: &ApiKey) -> Result<()>;
    fn update_api_key(&self, api_key: &ApiKey) -> Result<()>;

    fn get_api_key(&self, key: &str) -> Result<ApiKey>;
    fn api_keys_of_dataset(&self, dataset_id: &str) -> Result<Vec<ApiKey>>;
}

pub trait GroupRepo {
    fn create_group(&self, group: &Group) -> Result<()>;
    fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<()>;

    fn get_group(&self, id: &str) -> Result<Group>;
    fn groups_of_dataset(&self, dataset_id: &str) -> Result<Vec<Group>>;
    fn groups_of_user_in_dataset(&self, user_id: &str, dataset_id: &str) -> Result<Vec<Group>>;
    fn group_member_ids(&self, group_id: &str) -> Result<Vec<Id>>;
}
