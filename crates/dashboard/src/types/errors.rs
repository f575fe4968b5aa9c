//! Error types for the dashboard aggregator.

use thiserror::Error;

use ayf_store::StoreError;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("not authenticated")]
    AuthenticationRequired,

    #[error("export failed: {0}")]
    Export(String),

    #[error("remote store error: {0}")]
    Remote(#[from] StoreError),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
