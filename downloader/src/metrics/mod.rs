pub mod exporter;
pub mod reporter;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::time::Duration;

use crate::types::jobs::types::JobStatus;

pub use exporter::{MetricsExporter, NoopExporter, PullExporter, PushExporter};
pub use reporter::MetricsReporter;

/// Registry state in the prometheus text format, served on `/metrics` and pushed to the gateway
pub fn encode_text(registry: &Registry) -> Result<Vec<u8>, prometheus::Error> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}

const DURATION_BUCKETS: &[f64] = &[1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0];
const DOCUMENT_BUCKETS: &[f64] = &[0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 50.0, 100.0];

/// Metric catalog of the worker, registered on a single [Registry].
///
/// The catalog is the same whatever the exposition mode; only the exporter differs.
#[derive(Clone)]
pub struct WorkerMetrics {
    registry: Registry,
    pub jobs_processed_total: IntCounterVec,
    pub jobs_failed_total: IntCounter,
    pub documents_downloaded_total: IntCounter,
    pub documents_uploaded_total: IntCounter,
    pub blob_upload_failures_total: IntCounter,
    pub active_jobs: IntGauge,
    pub pending_jobs: IntGauge,
    pub completed_jobs: IntGauge,
    pub failed_jobs: IntGauge,
    pub job_processing_duration_seconds: Histogram,
    pub documents_per_job: Histogram,
}

impl WorkerMetrics {
    pub fn register(registry: Registry) -> Result<Self, prometheus::Error> {
        let jobs_processed_total = IntCounterVec::new(
            Opts::new("jobs_processed_total", "Jobs finalized by this worker, by terminal status"),
            &["status"],
        )?;
        // Terminal statuses are exposed from the start, at 0
        for status in [JobStatus::Completed, JobStatus::PartialFailed, JobStatus::Failed] {
            jobs_processed_total.with_label_values(&[status.as_str()]);
        }

        let metrics = Self {
            jobs_processed_total,
            jobs_failed_total: IntCounter::new("jobs_failed_total", "Jobs that failed as a whole")?,
            documents_downloaded_total: IntCounter::new(
                "documents_downloaded_total",
                "Documents obtained from the document source",
            )?,
            documents_uploaded_total: IntCounter::new(
                "documents_uploaded_total",
                "Documents stored in the object store",
            )?,
            blob_upload_failures_total: IntCounter::new(
                "blob_upload_failures_total",
                "Failed object store uploads",
            )?,
            active_jobs: IntGauge::new("active_jobs", "Jobs currently leased by this worker")?,
            pending_jobs: IntGauge::new("pending_jobs", "Pending jobs seen before the claim")?,
            completed_jobs: IntGauge::new("completed_jobs", "Whether this run completed its job")?,
            failed_jobs: IntGauge::new("failed_jobs", "Whether this run failed its job")?,
            job_processing_duration_seconds: Histogram::with_opts(
                HistogramOpts::new("job_processing_duration_seconds", "Wall clock duration of one job run")
                    .buckets(DURATION_BUCKETS.to_vec()),
            )?,
            documents_per_job: Histogram::with_opts(
                HistogramOpts::new("documents_per_job", "Number of documents of a processed job")
                    .buckets(DOCUMENT_BUCKETS.to_vec()),
            )?,
            registry,
        };

        metrics.registry.register(Box::new(metrics.jobs_processed_total.clone()))?;
        metrics.registry.register(Box::new(metrics.jobs_failed_total.clone()))?;
        metrics.registry.register(Box::new(metrics.documents_downloaded_total.clone()))?;
        metrics.registry.register(Box::new(metrics.documents_uploaded_total.clone()))?;
        metrics.registry.register(Box::new(metrics.blob_upload_failures_total.clone()))?;
        metrics.registry.register(Box::new(metrics.active_jobs.clone()))?;
        metrics.registry.register(Box::new(metrics.pending_jobs.clone()))?;
        metrics.registry.register(Box::new(metrics.completed_jobs.clone()))?;
        metrics.registry.register(Box::new(metrics.failed_jobs.clone()))?;
        metrics.registry.register(Box::new(metrics.job_processing_duration_seconds.clone()))?;
        metrics.registry.register(Box::new(metrics.documents_per_job.clone()))?;

        Ok(metrics)
    }

    /// Catalog on a fresh registry
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::register(Registry::new())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Records the terminal status of a finalized job
    pub fn record_finalized(&self, status: JobStatus, hard_failure: bool) {
        self.jobs_processed_total.with_label_values(&[status.as_str()]).inc();
        if hard_failure {
            self.jobs_failed_total.inc();
        }
        self.completed_jobs.set(i64::from(status == JobStatus::Completed));
        self.failed_jobs.set(i64::from(status == JobStatus::Failed));
        self.active_jobs.dec();
    }

    pub fn observe_run(&self, duration: Duration, documents: u64) {
        self.job_processing_duration_seconds.observe(duration.as_secs_f64());
        self.documents_per_job.observe(documents as f64);
    }

}
