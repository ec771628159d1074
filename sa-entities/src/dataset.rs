use crate::{id::*, user::*};

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSet {
    pub id           : Id,
    pub owner        : Owner,
    pub slug         : String,
    pub display_name : String,
}

impl DataSet {
    pub fn is_owned_by(&self, user: &User) -> bool {
        self.owner.id == user.id
    }
}
