use crate::id::*;
use serde_json::Value;

#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id          : Id,
    pub username    : String,
    pub social_auth : Option<SocialAuth>,
}

/// Profile data that a social authentication provider
/// handed over when the user signed in.
#[derive(Debug, Clone, PartialEq)]
pub struct SocialAuth {
    pub provider: String,
    pub extra_data: Value,
}

/// The public, identifying part of a user that other
/// entities embed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Owner {
    pub id: Id,
    pub username: String,
}

impl From<&User> for Owner {
    fn from(from: &User) -> Self {
        Self {
            id: from.id.clone(),
            username: from.username.clone(),
        }
    }
}
