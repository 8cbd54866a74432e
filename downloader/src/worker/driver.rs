use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, Instrument};
use uuid::Uuid;

use crate::core::config::Config;
use crate::error::JobResult;
use crate::metrics::MetricsReporter;
use crate::types::constant::{EXIT_JOB_FAILED, EXIT_SUCCESS};
use crate::types::jobs::types::JobStatus;
use crate::types::worker_id::WorkerIdentity;
use crate::worker::lease::LeaseManager;
use crate::worker::lifecycle::LifecycleController;
use crate::worker::pipeline::DocumentPipeline;
use crate::WorkerResult;

/// What a single invocation of the worker did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was claimable
    NoWork,
    Finished { job_id: Uuid, status: JobStatus, total: u64, uploaded: u64, failed: u64, skipped: u64 },
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Finished { status: JobStatus::Failed, .. } => EXIT_JOB_FAILED,
            _ => EXIT_SUCCESS,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoWork => write!(f, "no work"),
            RunOutcome::Finished { job_id, status, total, uploaded, failed, skipped } => write!(
                f,
                "job {} {} ({} documents: {} uploaded, {} failed, {} skipped)",
                job_id, status, total, uploaded, failed, skipped
            ),
        }
    }
}

/// Single-shot driver: claims at most one job, processes it and reports.
pub struct WorkerDriver {
    config: Arc<Config>,
    reporter: MetricsReporter,
}

impl WorkerDriver {
    pub fn new(config: Arc<Config>, reporter: MetricsReporter) -> Self {
        Self { config, reporter }
    }

    /// Full invocation: starts the exporter, runs once, reports and stops the exporter.
    pub async fn run(&mut self, identity: &WorkerIdentity) -> WorkerResult<RunOutcome> {
        self.reporter.start().await?;

        let result = self.run_once(identity).await;
        match &result {
            Ok(outcome) => self.reporter.report(outcome, identity).await,
            Err(e) => self.reporter.report_error(e, identity).await,
        }

        self.reporter.shutdown().await;
        Ok(result?)
    }

    /// Claim, pipeline, finalize. Errors are infrastructure errors; job failures are outcomes.
    #[instrument(skip_all, fields(worker_id = %identity))]
    pub async fn run_once(&self, identity: &WorkerIdentity) -> JobResult<RunOutcome> {
        let config = self.config.as_ref();
        let metrics = self.config.metrics();

        let lease = LeaseManager::new(config.database(), config.params().claim_policy, &metrics);
        let Some(job) = lease.claim(identity).await? else {
            info!("No claimable job, nothing to do");
            return Ok(RunOutcome::NoWork);
        };

        let started_at = Instant::now();
        let span = tracing::info_span!("process_job", job_id = %job.id, attempt = job.attempts);

        let pipeline = DocumentPipeline::new(
            config.database(),
            config.storage(),
            config.source(),
            &metrics,
            &config.params().storage_namespace,
        );
        let result = pipeline.run(&job).instrument(span.clone()).await;

        let status = LifecycleController::new(config.database(), &metrics)
            .finalize(&job, &result)
            .instrument(span)
            .await?;

        let report = match &result {
            Ok(report) => Some(report),
            Err(e) => e.partial_report(),
        };
        let (total, uploaded, failed, skipped) = report
            .map(|r| (r.total_documents, r.uploaded(), r.failed(), r.skipped()))
            .unwrap_or_default();
        metrics.observe_run(started_at.elapsed(), total);

        Ok(RunOutcome::Finished { job_id: job.id, status, total, uploaded, failed, skipped })
    }
}
