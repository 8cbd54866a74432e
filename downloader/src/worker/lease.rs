use tracing::{info, warn};

use crate::core::client::database::JobStore;
use crate::error::JobResult;
use crate::metrics::WorkerMetrics;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::lease::ClaimPolicy;
use crate::types::jobs::types::JobStatus;
use crate::types::worker_id::WorkerIdentity;

/// Claims jobs for this worker. The store performs the claim atomically; the manager only
/// adds the bookkeeping around it.
pub struct LeaseManager<'a> {
    store: &'a dyn JobStore,
    policy: ClaimPolicy,
    metrics: &'a WorkerMetrics,
}

impl<'a> LeaseManager<'a> {
    pub fn new(store: &'a dyn JobStore, policy: ClaimPolicy, metrics: &'a WorkerMetrics) -> Self {
        Self { store, policy, metrics }
    }

    /// Leases one claimable job to `identity`, or returns `None` when there is no work.
    pub async fn claim(&self, identity: &WorkerIdentity) -> JobResult<Option<JobItem>> {
        match self.store.count_jobs_by_status(JobStatus::Pending).await {
            Ok(pending) => self.metrics.pending_jobs.set(i64::try_from(pending).unwrap_or(i64::MAX)),
            Err(e) => warn!(error = %e, "Failed to count pending jobs"),
        }

        let worker_id = identity.to_string();
        let Some(job) = self.store.claim_job(&self.policy, &worker_id).await? else {
            return Ok(None);
        };

        self.metrics.active_jobs.inc();

        if job.attempts > 1 {
            warn!(
                job_id = %job.id,
                company = %job.company_name_or_unknown(),
                attempts = job.attempts,
                "Claimed job whose previous lease went stale"
            );
        } else {
            info!(job_id = %job.id, company = %job.company_name_or_unknown(), "Claimed job");
        }

        Ok(Some(job))
    }
}
