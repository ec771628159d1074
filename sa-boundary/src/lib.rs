use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[cfg(feature = "entity-conversions")]
mod conv;

#[cfg(feature = "entity-conversions")]
pub use conv::*;

#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct User {
    pub id         : String,
    pub username   : String,
    pub name       : Option<String>,
    pub avatar_url : Option<String>,
}

#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct Attachment {
    pub name             : String,
    pub file             : String,
    pub created_datetime : String,
    pub updated_datetime : String,
}

/// The size of a collection and where to find it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct CollectionSummary {
    pub length: usize,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct Link {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
#[serde(untagged)]
pub enum SubmissionSets {
    Summary(BTreeMap<String, CollectionSummary>),
    /// The exploded submissions by set name
    Detailed(BTreeMap<String, Vec<Value>>),
}

/// A place before its data blob is exploded.
#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct Place {
    pub url              : String,
    pub id               : String,
    /// WKT
    pub geometry         : String,
    pub dataset          : String,
    pub attachments      : Vec<Attachment>,
    pub submitter        : Option<User>,
    pub data             : String,
    pub visible          : bool,
    pub created_datetime : String,
    pub updated_datetime : String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_sets  : Option<SubmissionSets>,
}

/// A submission before its data blob is exploded.
#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct Submission {
    pub url              : String,
    pub id               : String,
    pub dataset          : String,
    pub set              : String,
    pub place            : String,
    pub attachments      : Vec<Attachment>,
    pub submitter        : Option<User>,
    pub data             : String,
    pub visible          : bool,
    pub created_datetime : String,
    pub updated_datetime : String,
}

#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct DataSet {
    pub url             : String,
    pub id              : String,
    pub slug            : String,
    pub display_name    : String,
    /// Username of the owner
    pub owner           : String,
    pub keys            : Link,
    pub places          : CollectionSummary,
    pub submission_sets : BTreeMap<String, CollectionSummary>,
}

#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct Action {
    pub id               : String,
    pub action           : String,
    /// `place` or the name of the submission set
    pub target_type      : String,
    pub target           : Value,
    pub created_datetime : String,
}

#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct ApiKey {
    pub key        : String,
    pub dataset    : String,
    pub logged_ip  : Option<String>,
    pub last_used  : String,
}

#[rustfmt::skip]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct Metadata {
    pub length    : usize,
    pub next      : Option<String>,
    pub previous  : Option<String>,
    pub page      : usize,
    pub num_pages : usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "extra-derive", derive(PartialEq))]
pub struct Paginated<T> {
    pub metadata: Metadata,
    pub results: Vec<T>,
}
