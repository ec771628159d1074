use crate::id::*;
use strum::{Display, EnumString};

/// Matches every submission set.
pub const ANY_SUBMISSION_SET: &str = "*";

/// The actions that permission rules grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DataAction {
    Retrieve,
    Create,
    Update,
    Destroy,
}

/// The entity a permission rule belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PermissionScope {
    DataSet(Id),
    Key(Id),
    Group(Id),
}

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPermission {
    pub id             : Id,
    /// Name of a submission set or `*`
    pub submission_set : String,
    pub can_retrieve   : bool,
    pub can_create     : bool,
    pub can_update     : bool,
    pub can_destroy    : bool,
    /// Lower values are evaluated first
    pub priority       : i32,
}

impl DataPermission {
    /// Read access to everything. Every new dataset starts with this rule.
    pub fn read_only() -> Self {
        Self {
            id: Id::new(),
            submission_set: ANY_SUBMISSION_SET.into(),
            can_retrieve: true,
            can_create: false,
            can_update: false,
            can_destroy: false,
            priority: 0,
        }
    }

    /// Full access to everything. Every new API key starts with this rule.
    pub fn full_access() -> Self {
        Self {
            can_create: true,
            can_update: true,
            can_destroy: true,
            ..Self::read_only()
        }
    }

    pub fn matches(&self, submission_set: &str) -> bool {
        self.submission_set == submission_set || self.submission_set == ANY_SUBMISSION_SET
    }

    pub fn allows(&self, action: DataAction) -> bool {
        match action {
            DataAction::Retrieve => self.can_retrieve,
            DataAction::Create => self.can_create,
            DataAction::Update => self.can_update,
            DataAction::Destroy => self.can_destroy,
        }
    }
}
