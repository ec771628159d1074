use crate::{id::*, time::*};

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id         : Id,
    pub thing_id   : Id,
    pub name       : String,
    /// Storage location of the file
    pub file       : String,
    pub created_at : Timestamp,
    pub updated_at : Timestamp,
}
