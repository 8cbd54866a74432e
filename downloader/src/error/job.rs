use thiserror::Error;

use crate::core::client::database::DatabaseError;
use crate::core::client::source::SourceError;
use crate::worker::pipeline::PipelineReport;

pub type JobResult<T> = Result<T, JobError>;

/// Error types for job-related operations of the worker
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    /// The document source failed before any document could be processed
    #[error("Document source error: {0}")]
    DocumentSource(#[from] SourceError),

    /// The run stopped after some documents were recorded. `report` holds the recorded ones.
    #[error("Document pipeline interrupted after {} recorded documents: {cause}", .report.outcomes.len())]
    Interrupted {
        report: PipelineReport,
        #[source]
        cause: Box<JobError>,
    },
}

impl JobError {
    /// Outcomes recorded before the run failed, if any were
    pub fn partial_report(&self) -> Option<&PipelineReport> {
        match self {
            JobError::Interrupted { report, .. } => Some(report),
            _ => None,
        }
    }
}
