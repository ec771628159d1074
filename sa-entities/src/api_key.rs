use crate::{id::*, time::*};
use std::net::IpAddr;
use uuid::Uuid;

pub const KEY_SIZE: usize = 32;

/// Grants capabilities on a dataset without a logged-in user.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub id         : Id,
    pub key        : String,
    pub dataset_id : Id,
    pub logged_ip  : Option<IpAddr>,
    pub last_used  : Timestamp,
}

/// A random string of [`KEY_SIZE`] characters.
pub fn generate_unique_api_key() -> String {
    let key = Uuid::new_v4().as_simple().to_string();
    debug_assert_eq!(KEY_SIZE, key.len());
    key
}
