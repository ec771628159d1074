use crate::id::*;

/// A named role of users that is scoped to one dataset.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id         : Id,
    pub dataset_id : Id,
    pub name       : String,
}
