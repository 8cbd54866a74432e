use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    /// The job is queued and waiting for a worker to claim it
    #[default]
    Pending,
    /// A worker holds the lease and is downloading the job's documents
    Processing,
    /// Every document was handled without failure
    Completed,
    /// Some, but not all, documents failed
    PartialFailed,
    /// The run aborted, or every document failed
    Failed,
}

impl JobStatus {
    /// Terminal jobs are never claimed again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::PartialFailed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::PartialFailed => "partial_failed",
            JobStatus::Failed => "failed",
        }
    }
}
