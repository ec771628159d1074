use crate::id::*;
use serde_json::{Map, Value};

/// Names one attribute of the data blob that is indexed
/// for all things of a dataset.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataIndex {
    pub id         : Id,
    pub dataset_id : Id,
    pub attr_name  : String,
}

impl DataIndex {
    /// The indexed representation of this attribute in the given blob.
    pub fn extract(&self, blob: &Map<String, Value>) -> Option<String> {
        blob.get(&self.attr_name).map(indexed_value_string)
    }
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedValue {
    pub id       : Id,
    pub index_id : Id,
    pub thing_id : Id,
    pub value    : String,
}

/// Strings are indexed verbatim, all other values by their JSON text.
///
/// The number `2` and the string `"2"` both end up as `2`,
/// which lets queries match regardless of how a client
/// encoded the value.
pub fn indexed_value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
