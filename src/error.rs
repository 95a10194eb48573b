//! Unified error type.

use thiserror::Error;

/// The error type returned by the service's fallible startup and serving
/// operations.
///
/// Application-level errors (400, 404, 500 on a single request) are expressed
/// as HTTP [`Response`](crate::Response) values via
/// [`ApiError`](crate::ApiError), not as `Error`s. This type surfaces
/// infrastructure failures: loading configuration, reaching MongoDB, binding
/// to a port.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config: {0}")]
    Config(String),

    #[error("database: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("database: ping timed out after {0:?}")]
    PingTimeout(std::time::Duration),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
