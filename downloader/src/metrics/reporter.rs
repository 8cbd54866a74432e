use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::JobError;
use crate::metrics::exporter::{MetricsExporter, NoopExporter, PullExporter, PushExporter};
use crate::metrics::WorkerMetrics;
use crate::types::params::MetricsConfig;
use crate::types::worker_id::WorkerIdentity;
use crate::worker::driver::RunOutcome;
use crate::WorkerResult;

/// Owns the metric catalog and the exporter chosen for this deployment
pub struct MetricsReporter {
    metrics: Arc<WorkerMetrics>,
    exporter: Box<dyn MetricsExporter>,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<WorkerMetrics>, exporter: Box<dyn MetricsExporter>) -> Self {
        Self { metrics, exporter }
    }

    pub fn from_config(config: &MetricsConfig, metrics: Arc<WorkerMetrics>) -> Self {
        let registry = metrics.registry().clone();
        let exporter: Box<dyn MetricsExporter> = match config {
            MetricsConfig::Pull { address } => Box::new(PullExporter::new(*address, registry)),
            MetricsConfig::Push(params) => Box::new(PushExporter::new(params.clone(), registry)),
            MetricsConfig::Disabled => Box::new(NoopExporter),
        };
        Self::new(metrics, exporter)
    }

    pub async fn start(&mut self) -> WorkerResult<()> {
        self.exporter.start().await
    }

    /// Publishes the end-of-run snapshot. Exposition failures are logged, never returned.
    pub async fn report(&self, outcome: &RunOutcome, identity: &WorkerIdentity) {
        if let RunOutcome::NoWork = outcome {
            self.metrics.completed_jobs.set(0);
            self.metrics.failed_jobs.set(0);
        }

        match self.exporter.publish(&identity.to_string()).await {
            Ok(()) => info!(outcome = %outcome, "Run reported"),
            Err(e) => warn!(error = %e, "Failed to publish metrics"),
        }
    }

    /// Publishes what was counted before an infrastructure error ended the run.
    pub async fn report_error(&self, err: &JobError, identity: &WorkerIdentity) {
        match self.exporter.publish(&identity.to_string()).await {
            Ok(()) => info!(error = %err, "Run reported after infrastructure error"),
            Err(e) => warn!(error = %e, "Failed to publish metrics"),
        }
    }

    pub async fn shutdown(&mut self) {
        if let Err(e) = self.exporter.shutdown().await {
            error!(error = %e, error_chain = ?e, "Failed to stop metrics exporter");
        }
    }
}
