use crate::id::*;

/// Groups the submissions of one type (e.g. "comments")
/// under a single place.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionSet {
    pub id       : Id,
    pub place_id : Id,
    pub name     : String,
}
