use tracing::{debug, error, info, warn};

use crate::core::client::database::JobStore;
use crate::core::client::source::DocumentSource;
use crate::core::client::storage::{document_key, StorageClient};
use crate::error::{JobError, JobResult};
use crate::metrics::WorkerMetrics;
use crate::types::jobs::document::{DocumentOutcome, DocumentRecord};
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::job_updates::JobItemUpdates;

/// Outcomes of one pipeline run, in processing order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub total_documents: u64,
    pub outcomes: Vec<DocumentOutcome>,
}

impl PipelineReport {
    pub fn uploaded(&self) -> u64 {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Uploaded { .. }))
    }

    pub fn failed(&self) -> u64 {
        self.count(DocumentOutcome::is_failure)
    }

    pub fn skipped(&self) -> u64 {
        self.count(|outcome| matches!(outcome, DocumentOutcome::Skipped))
    }

    fn count(&self, predicate: impl Fn(&DocumentOutcome) -> bool) -> u64 {
        self.outcomes.iter().filter(|outcome| predicate(outcome)).count() as u64
    }
}

/// Percentage of processed documents, rounded down
pub fn progress_percent(processed: u64, total: u64) -> u32 {
    if total == 0 {
        return 100;
    }
    (processed.min(total).saturating_mul(100) / total) as u32
}

/// Fetches every document of a job, stores it and records one outcome per document.
///
/// Failures of a single document are recorded and the loop moves on. Only a failing
/// document source (before the first document) or a failing job store aborts the run.
pub struct DocumentPipeline<'a> {
    store: &'a dyn JobStore,
    storage: Option<&'a dyn StorageClient>,
    source: &'a dyn DocumentSource,
    metrics: &'a WorkerMetrics,
    namespace: &'a str,
}

impl<'a> DocumentPipeline<'a> {
    pub fn new(
        store: &'a dyn JobStore,
        storage: Option<&'a dyn StorageClient>,
        source: &'a dyn DocumentSource,
        metrics: &'a WorkerMetrics,
        namespace: &'a str,
    ) -> Self {
        Self { store, storage, source, metrics, namespace }
    }

    pub async fn run(&self, job: &JobItem) -> JobResult<PipelineReport> {
        let total_documents = self.source.document_count(job).await?;
        info!(job_id = %job.id, total_documents, "Downloading documents");

        // Visible to observers before the first document is processed
        self.store.update_job(job.id, JobItemUpdates::new().update_total_documents(total_documents)).await?;

        let mut report =
            PipelineReport { total_documents, outcomes: Vec::with_capacity(total_documents.min(1024) as usize) };
        for document_number in 1..=total_documents {
            let outcome = self.process_document(job, document_number).await;

            let record = DocumentRecord::new(job, document_number, &outcome);
            if let Err(e) = self.store.insert_document(record).await {
                error!(job_id = %job.id, document_number, error = %e, "Failed to record document outcome");
                return Err(JobError::Interrupted { report, cause: Box::new(e.into()) });
            }
            // Only recorded outcomes count, so the job counters match the documents collection
            report.outcomes.push(outcome);

            let progress = progress_percent(document_number, total_documents);
            if let Err(e) = self.store.update_job(job.id, JobItemUpdates::new().update_progress(progress)).await {
                warn!(job_id = %job.id, progress, error = %e, "Failed to update job progress");
            }
        }

        Ok(report)
    }

    async fn process_document(&self, job: &JobItem, document_number: u64) -> DocumentOutcome {
        let payload = match self.source.fetch_document(job, document_number).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(job_id = %job.id, document_number, error = %e, "Failed to fetch document");
                return DocumentOutcome::Failed { reason: e.to_string() };
            }
        };
        self.metrics.documents_downloaded_total.inc();

        let Some(storage) = self.storage else {
            debug!(job_id = %job.id, document_number, "No object store configured, skipping upload");
            return DocumentOutcome::Skipped;
        };

        let key = document_key(self.namespace, &job.id, document_number);
        match storage.put_data(payload, &key).await {
            Ok(location) => {
                self.metrics.documents_uploaded_total.inc();
                debug!(job_id = %job.id, document_number, location = %location, "Document uploaded");
                DocumentOutcome::Uploaded { location }
            }
            Err(e) => {
                self.metrics.blob_upload_failures_total.inc();
                error!(job_id = %job.id, document_number, key = %key, error = %e, "Failed to upload document");
                DocumentOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}
