#[macro_use]
extern crate log;

mod api_keys;
mod attachments;
mod datasets;
mod groups;
mod indexes;
mod invalidate;
mod places;
mod reads;
mod requester;
mod submissions;

pub mod serializers;

pub mod prelude {
    pub use super::{
        api_keys::*, attachments::*, datasets::*, groups::*, indexes::*, invalidate::*,
        places::*, reads::*, requester::*, submissions::*,
    };
}

pub mod error;

pub type Result<T> = std::result::Result<T, error::AppError>;

pub(crate) use sa_core::{db::*, entities::*, repositories::*, usecases, RepoError};

use sa_core::cache::CacheKeys;

#[cfg(test)]
pub(crate) mod tests;

pub(crate) mod sqlite {
    pub use sa_db_sqlite::Connections;
}

/// The resources that every flow needs.
#[derive(Clone, Copy)]
pub struct Backend<'a> {
    pub connections: &'a sa_db_sqlite::Connections,
    pub cache: CacheKeys<'a>,
    /// Prefix of all absolute URLs in serialized responses
    pub base_url: &'a str,
}

/// Load a dataset by owner and slug.
pub(crate) fn load_dataset<R: DataSetRepo>(repo: &R, owner: &str, slug: &str) -> Result<DataSet> {
    Ok(repo.get_dataset_by_slug(owner, slug)?)
}
