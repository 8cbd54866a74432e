use chrono::{DateTime, Utc};

use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::types::JobStatus;

/// Defining a structure that contains the changes to be made in the job object.
/// `updatedAt` is always refreshed when an update is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobItemUpdates {
    pub job_status: Option<JobStatus>,
    pub total_documents: Option<u64>,
    pub uploaded_documents: Option<u64>,
    pub failed_documents: Option<u64>,
    pub progress: Option<u32>,
    pub stage_status: Option<JobStatus>,
    /// unset `lockedBy` and `lockedAt`
    pub clear_lease: bool,
}

impl JobItemUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_status(mut self, status: JobStatus) -> Self {
        self.job_status = Some(status);
        self.stage_status = Some(status);
        self
    }

    pub fn update_total_documents(mut self, total: u64) -> Self {
        self.total_documents = Some(total);
        self
    }

    pub fn update_uploaded_documents(mut self, uploaded: u64) -> Self {
        self.uploaded_documents = Some(uploaded);
        self
    }

    pub fn update_failed_documents(mut self, failed: u64) -> Self {
        self.failed_documents = Some(failed);
        self
    }

    pub fn update_progress(mut self, progress: u32) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn release_lease(mut self) -> Self {
        self.clear_lease = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether the update touches the download stage sub-document
    pub fn touches_stage(&self) -> bool {
        self.stage_status.is_some() || self.total_documents.is_some()
    }

    /// Applies the update to an in-memory copy of the job, with the same semantics as
    /// the `$set`/`$unset` document the MongoDB store builds.
    pub fn apply(&self, job: &mut JobItem, now: DateTime<Utc>) {
        if let Some(status) = self.job_status {
            job.job_status = status;
        }
        if let Some(total) = self.total_documents {
            job.total_documents = total;
            job.processing_stages.document_download.total_documents = Some(total);
        }
        if let Some(uploaded) = self.uploaded_documents {
            job.uploaded_documents = uploaded;
        }
        if let Some(failed) = self.failed_documents {
            job.failed_documents = failed;
        }
        if let Some(progress) = self.progress {
            job.progress = progress;
        }
        if let Some(stage_status) = self.stage_status {
            job.processing_stages.document_download.status = stage_status;
        }
        if self.touches_stage() {
            job.processing_stages.document_download.last_updated = Some(now);
        }
        if self.clear_lease {
            job.locked_by = None;
            job.locked_at = None;
        }
        job.updated_at = now;
    }
}
