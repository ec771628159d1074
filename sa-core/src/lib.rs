//! # sa-core
//!
//! Business logic of Shareabouts: ports, the cache-key engine,
//! the permission engine, the data blob processor and the
//! use cases that operate on the repositories.

pub mod blob;
pub mod cache;
pub mod db;
pub mod repositories;
pub mod routes;
pub mod usecases;
pub mod util;

pub mod entities {
    pub use sa_entities::{
        action::*, api_key::*, attachment::*, data_index::*, dataset::*, geometry::*, group::*,
        id::*, permission::*, submission_set::*, thing::*, time::*, user::*,
    };
}

pub use self::repositories::Error as RepoError;
