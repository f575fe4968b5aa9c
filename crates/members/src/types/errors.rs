//! Error types for member management.

use thiserror::Error;

use ayf_store::StoreError;

#[derive(Debug, Error)]
pub enum MembersError {
    #[error("profile not found")]
    ProfileNotFound,

    #[error("not authenticated")]
    AuthenticationRequired,

    #[error("administrator access required")]
    AdminRequired,

    #[error("invalid profile data: {0}")]
    Validation(String),

    #[error("remote store error: {0}")]
    Remote(StoreError),
}

pub type MembersResult<T> = Result<T, MembersError>;

impl From<StoreError> for MembersError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => MembersError::ProfileNotFound,
            other => MembersError::Remote(other),
        }
    }
}
