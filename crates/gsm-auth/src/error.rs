//! Error types for the service.

use bound_store::StoreError;
use thiserror::Error;
use tonic::Status;

/// Failures that stop the service from starting or keep it from serving.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Failed to open log sink: {0}")]
    Logging(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Result type alias for startup.
pub type StartupResult<T> = Result<T, StartupError>;

/// Map a store failure to the status returned to the caller.
///
/// The message is the store's own; the phone number is never part of it.
pub fn store_status(e: StoreError) -> Status {
    match e {
        StoreError::Unavailable(_) => Status::unavailable(e.to_string()),
        StoreError::Timeout(_) => Status::deadline_exceeded(e.to_string()),
    }
}
