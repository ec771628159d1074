use crate::{geometry::*, id::*, time::*};
use serde_json::{Map, Value};
use std::fmt;

/// The free-form JSON attributes of a thing, stored as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlob(String);

impl DataBlob {
    pub fn parse(&self) -> Result<Map<String, Value>, serde_json::Error> {
        if self.0.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DataBlob {
    fn default() -> Self {
        Self("{}".into())
    }
}

impl From<String> for DataBlob {
    fn from(from: String) -> Self {
        Self(from)
    }
}

impl From<&str> for DataBlob {
    fn from(from: &str) -> Self {
        Self(from.to_owned())
    }
}

impl From<&Map<String, Value>> for DataBlob {
    fn from(from: &Map<String, Value>) -> Self {
        // Serializing a map of JSON values cannot fail
        Self(Value::Object(from.clone()).to_string())
    }
}

impl From<DataBlob> for String {
    fn from(from: DataBlob) -> Self {
        from.0
    }
}

impl fmt::Display for DataBlob {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.0)
    }
}

/// Attributes shared by places and submissions.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    pub id           : Id,
    pub dataset_id   : Id,
    pub submitter_id : Option<Id>,
    pub data         : DataBlob,
    pub visible      : bool,
    pub created_at   : Timestamp,
    pub updated_at   : Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThingKind {
    Place,
    Submission,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub thing: Thing,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub thing: Thing,
    /// The submission set
    pub parent_id: Id,
}

impl Place {
    pub fn id(&self) -> &Id {
        &self.thing.id
    }
}

impl Submission {
    pub fn id(&self) -> &Id {
        &self.thing.id
    }
}
