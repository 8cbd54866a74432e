pub mod job;

use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::core::client::source::SourceError;
use crate::core::client::storage::StorageError;
pub use job::{JobError, JobResult};

/// Result type for worker operations
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Error types for the worker process
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Document source error: {0}")]
    SourceError(#[from] SourceError),

    #[error("Job error: {0}")]
    JobError(#[from] JobError),

    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Metrics server error: {0}")]
    ServerError(String),

    #[error("Metrics push error: {0}")]
    PushError(#[from] reqwest::Error),

    #[error("Logging setup error: {0}")]
    LoggingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

