use crate::db::RepoError;
use thiserror::Error;

/// Point accounting errors
#[derive(Debug, Error)]
pub enum PointError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),

    #[error("Customer not found: {0}")]
    CustomerNotFound(i64),
}

pub type PointResult<T> = Result<T, PointError>;
