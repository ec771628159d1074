use crate::{id::*, time::*};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ActionKind {
    Create,
    Update,
}

/// An entry of the append-only activity log.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id         : Id,
    pub thing_id   : Id,
    pub action     : ActionKind,
    /// Origin of the request that triggered the action, e.g. the referer
    pub source     : Option<String>,
    pub created_at : Timestamp,
}
