pub const DOWNLOADER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix used for every object key written by this worker
pub const DEFAULT_STORAGE_NAMESPACE: &str = "jobs";

/// Progress value written when a job reaches a terminal state
pub const PROGRESS_DONE: u32 = 100;

pub fn document_file_name(sequence_number: u64) -> String {
    format!("document_{}.txt", sequence_number)
}

/// Exit code of a run that ended without a job, or with a `completed`/`partial_failed` job
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code of a run whose job was finalized as `failed`
pub const EXIT_JOB_FAILED: u8 = 1;
/// Exit code of a run aborted by a configuration or infrastructure error
pub const EXIT_INFRASTRUCTURE_ERROR: u8 = 2;
