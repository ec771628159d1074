//! Keeps the schema-less data blob of a thing in sync with
//! its declared fields.

use serde_json::{Map, Value};
use thiserror::Error;

/// Blob keys with this prefix are only visible on request.
pub const PRIVATE_PREFIX: &str = "private";

/// The name of the raw blob in a representation.
pub const DATA_FIELD: &str = "data";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("The data blob is not a JSON object")]
    NotAnObject,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, BlobError>;

/// A field with a dedicated column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub read_only: bool,
    /// Written on full updates when the field is missing
    pub default: Option<Value>,
}

impl Field {
    pub const fn read_only(name: &'static str) -> Self {
        Self {
            name,
            read_only: true,
            default: None,
        }
    }

    pub const fn writable(name: &'static str) -> Self {
        Self {
            name,
            read_only: false,
            default: None,
        }
    }

    pub fn with_default(self, default: Value) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

/// The incoming fields of a write, split into declared fields and blob.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredFields {
    pub fields: Map<String, Value>,
    pub blob: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct DataBlobProcessor {
    fields: Vec<Field>,
}

impl DataBlobProcessor {
    pub fn new(fields: Vec<Field>) -> Self {
        debug_assert!(fields.iter().all(|f| f.name != DATA_FIELD));
        Self { fields }
    }

    pub fn for_places() -> Self {
        Self::new(vec![
            Field::read_only("url"),
            Field::read_only("id"),
            Field::writable("geometry"),
            Field::read_only("dataset"),
            Field::read_only("attachments"),
            Field::writable("submitter"),
            Field::writable("visible").with_default(Value::Bool(true)),
            Field::read_only("created_datetime"),
            Field::read_only("updated_datetime"),
            Field::read_only("submission_sets"),
        ])
    }

    pub fn for_submissions() -> Self {
        Self::new(vec![
            Field::read_only("url"),
            Field::read_only("id"),
            Field::read_only("dataset"),
            Field::read_only("set"),
            Field::read_only("place"),
            Field::read_only("attachments"),
            Field::writable("submitter"),
            Field::writable("visible").with_default(Value::Bool(true)),
            Field::read_only("created_datetime"),
            Field::read_only("updated_datetime"),
        ])
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Replace the raw `data` field of a representation by the
    /// keys of the blob.
    ///
    /// Declared fields take precedence over blob keys with the same name.
    pub fn explode(
        &self,
        mut representation: Map<String, Value>,
        include_private: bool,
    ) -> Result<Map<String, Value>> {
        let blob = match representation.remove(DATA_FIELD) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::String(text)) if text.trim().is_empty() => Map::new(),
            Some(Value::String(text)) => match serde_json::from_str(&text)? {
                Value::Object(blob) => blob,
                _ => return Err(BlobError::NotAnObject),
            },
            Some(Value::Object(blob)) => blob,
            Some(_) => return Err(BlobError::NotAnObject),
        };
        for (key, value) in blob {
            if !include_private && key.starts_with(PRIVATE_PREFIX) {
                continue;
            }
            if self.is_declared(&key) {
                log::debug!("Ignoring blob key '{key}' that shadows a declared field");
                continue;
            }
            representation.insert(key, value);
        }
        Ok(representation)
    }

    /// Partition the fields of a write.
    ///
    /// Everything that is not declared ends up in the blob,
    /// including a field named `data`. Unless the write is
    /// partial, missing writable fields get their default.
    pub fn restore(&self, incoming: Map<String, Value>, partial: bool) -> RestoredFields {
        let mut fields = Map::new();
        let mut blob = Map::new();
        for (key, value) in incoming {
            if self.is_declared(&key) {
                fields.insert(key, value);
            } else {
                blob.insert(key, value);
            }
        }
        if !partial {
            for field in self.fields.iter().filter(|f| !f.read_only) {
                if !fields.contains_key(field.name) {
                    fields.insert(
                        field.name.to_string(),
                        field.default.clone().unwrap_or(Value::Null),
                    );
                }
            }
        }
        RestoredFields { fields, blob }
    }
}
