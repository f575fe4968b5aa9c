//! Error types for remote store calls.

use thiserror::Error;

/// Failures surfaced by the remote store client.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("remote call failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("remote store rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("record not found")]
    NotFound,

    #[error("failed to decode remote payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("service role key is not configured")]
    MissingServiceKey,

    #[error("count response was missing or malformed")]
    MalformedCount,
}

pub type StoreResult<T> = Result<T, StoreError>;
