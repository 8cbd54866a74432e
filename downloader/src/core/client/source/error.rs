use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Unable to determine document count for job {job_id}: {reason}")]
    CountUnavailable { job_id: Uuid, reason: String },

    #[error("Failed to fetch document {document_number} for job {job_id}: {reason}")]
    FetchFailed { job_id: Uuid, document_number: u64, reason: String },

    #[error("Invalid document source configuration: {0}")]
    InvalidConfiguration(String),
}
