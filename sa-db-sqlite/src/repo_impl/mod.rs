use anyhow::anyhow;
use diesel::{
    self,
    prelude::{Connection as DieselConnection, *},
    result::{DatabaseErrorKind, Error as DieselError},
};

use sa_core::{
    entities::*,
    repositories::{self as repo, *},
};

use super::*;

mod access;
mod dataset;
mod index;
mod thing;
mod trace;
mod user;

type Result<T> = std::result::Result<T, repo::Error>;

pub fn from_diesel_err(err: DieselError) -> repo::Error {
    match err {
        DieselError::NotFound => repo::Error::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            repo::Error::AlreadyExists
        }
        _ => repo::Error::Other(err.into()),
    }
}

fn load_timestamp(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millis(millis)
        .ok_or_else(|| anyhow!("Invalid timestamp: {millis}").into())
}

/// Updates and deletions by primary key must hit exactly one row.
fn single_row(count: usize) -> Result<()> {
    if count == 0 {
        return Err(repo::Error::NotFound);
    }
    debug_assert_eq!(1, count);
    Ok(())
}
