mod api_keys;
mod attachments;
mod check_data_permission;
mod datasets;
mod error;
mod groups;
mod indexing;
mod store_thing;
mod summaries;

#[cfg(test)]
pub mod tests;

type Result<T> = std::result::Result<T, Error>;

pub use self::{
    api_keys::*, attachments::*, check_data_permission::*, datasets::*, error::Error, groups::*,
    indexing::*, store_thing::*, summaries::*,
};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{db::*, entities::*, repositories::*, RepoError};
}
