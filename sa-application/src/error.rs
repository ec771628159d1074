use sa_core::{cache, repositories::Error as RepoError, usecases::Error as ParameterError};
use thiserror::Error;

pub use sa_core::repositories;

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> AppError {
        AppError::Business(BError::Repo(err))
    }
}

impl From<ParameterError> for AppError {
    fn from(err: ParameterError) -> AppError {
        AppError::Business(err.into())
    }
}

impl From<cache::Error> for AppError {
    fn from(err: cache::Error) -> AppError {
        AppError::Business(BError::Cache(err))
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Business(#[from] BError),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error(transparent)]
    String(#[from] ::std::string::FromUtf8Error),
    #[error(transparent)]
    Csv(#[from] ::csv::Error),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Business(BError::Repo(RepoError::NotFound)))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Business(BError::Parameter(ParameterError::Forbidden)))
    }
}

#[derive(Debug, Error)]
pub enum BError {
    #[error(transparent)]
    Parameter(ParameterError),
    #[error(transparent)]
    Repo(#[from] repositories::Error),
    #[error(transparent)]
    Cache(cache::Error),
}

impl From<ParameterError> for BError {
    fn from(err: ParameterError) -> Self {
        match err {
            ParameterError::Repo(err) => Self::Repo(err),
            ParameterError::Cache(cache::Error::Repo(err)) => Self::Repo(err),
            ParameterError::Cache(err) => Self::Cache(err),
            err => Self::Parameter(err),
        }
    }
}
