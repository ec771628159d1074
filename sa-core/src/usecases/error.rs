use crate::{blob::BlobError, cache, entities::GeometryParseError, repositories};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid action '{0}'")]
    InvalidAction(String),
    #[error("Invalid slug")]
    Slug,
    #[error("Invalid username")]
    Username,
    #[error("Invalid submission set name")]
    SubmissionSetName,
    #[error("Invalid attribute name")]
    AttributeName,
    #[error("Invalid group name")]
    GroupName,
    #[error("Invalid IP address")]
    IpAddress,
    #[error("The attribute '{0}' is not present in the data blob")]
    AttributeNotFound(String),
    #[error("The place does not belong to the dataset")]
    PlaceNotInDataSet,
    #[error("The user is already a member of the group")]
    AlreadyMember,
    #[error("This is not allowed")]
    Forbidden,
    #[error(transparent)]
    Geometry(#[from] GeometryParseError),
    #[error("Invalid data blob: {0}")]
    Blob(#[from] serde_json::Error),
    #[error(transparent)]
    BlobFormat(#[from] BlobError),
    #[error(transparent)]
    Cache(#[from] cache::Error),
    #[error(transparent)]
    Repo(#[from] repositories::Error),
}
