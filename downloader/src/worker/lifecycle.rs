use tracing::{error, info};

use crate::core::client::database::JobStore;
use crate::error::{JobError, JobResult};
use crate::metrics::WorkerMetrics;
use crate::types::constant::PROGRESS_DONE;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::types::JobStatus;
use crate::worker::pipeline::PipelineReport;

/// Terminal status of a run.
///
/// A run that failed as a whole is `failed`. Otherwise the per-document failures decide:
/// none is `completed` (this includes empty and all-skipped runs), some is `partial_failed`,
/// all is `failed`.
pub fn derive_status(result: &Result<PipelineReport, JobError>) -> JobStatus {
    let report = match result {
        Ok(report) => report,
        Err(_) => return JobStatus::Failed,
    };

    let failed = report.failed();
    let total = report.outcomes.len() as u64;

    if failed == 0 {
        JobStatus::Completed
    } else if failed < total {
        JobStatus::PartialFailed
    } else {
        JobStatus::Failed
    }
}

/// Writes the terminal state of a job and releases its lease
pub struct LifecycleController<'a> {
    store: &'a dyn JobStore,
    metrics: &'a WorkerMetrics,
}

impl<'a> LifecycleController<'a> {
    pub fn new(store: &'a dyn JobStore, metrics: &'a WorkerMetrics) -> Self {
        Self { store, metrics }
    }

    pub async fn finalize(&self, job: &JobItem, result: &Result<PipelineReport, JobError>) -> JobResult<JobStatus> {
        let status = derive_status(result);

        // A run interrupted by the store still reports what it recorded
        let report = match result {
            Ok(report) => Some(report),
            Err(e) => {
                error!(job_id = %job.id, error = %e, error_chain = ?e, "Job failed");
                e.partial_report()
            }
        };
        let (uploaded, failed) = report.map(|report| (report.uploaded(), report.failed())).unwrap_or((0, 0));

        // Single keyed update; the lease holder owns the job until this lands
        let update = JobItemUpdates::new()
            .update_status(status)
            .update_uploaded_documents(uploaded)
            .update_failed_documents(failed)
            .update_progress(PROGRESS_DONE)
            .release_lease();
        if let Err(e) = self.store.update_job(job.id, update).await {
            // The run is over even when the write fails
            self.metrics.active_jobs.dec();
            return Err(e.into());
        }

        self.metrics.record_finalized(status, result.is_err());
        info!(job_id = %job.id, status = %status, uploaded, failed, "Job finalized");

        Ok(status)
    }
}
