use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use std::time::Duration;
use tracing::trace;

use super::{DocumentSource, SourceError};
use crate::types::jobs::job_item::JobItem;
use crate::types::params::source::SourceParams;

/// Document source that fabricates plain-text documents.
///
/// Each job gets a random number of documents in `min_documents..=max_documents`, and every
/// fetch waits `fetch_delay` to stand in for the upstream round trip.
#[derive(Debug, Clone)]
pub struct SimulatedDocumentSource {
    min_documents: u64,
    max_documents: u64,
    fetch_delay: Duration,
}

impl SimulatedDocumentSource {
    pub fn new(min_documents: u64, max_documents: u64, fetch_delay: Duration) -> Result<Self, SourceError> {
        if min_documents > max_documents {
            return Err(SourceError::InvalidConfiguration(format!(
                "min documents ({}) is greater than max documents ({})",
                min_documents, max_documents
            )));
        }
        Ok(Self { min_documents, max_documents, fetch_delay })
    }

    pub fn from_params(params: &SourceParams) -> Result<Self, SourceError> {
        Self::new(params.min_documents, params.max_documents, params.fetch_delay)
    }

    fn payload(job: &JobItem, document_number: u64) -> String {
        format!("Document {} for {} ({})", document_number, job.company_name_or_unknown(), job.cin_or_unknown())
    }
}

#[async_trait]
impl DocumentSource for SimulatedDocumentSource {
    async fn document_count(&self, _job: &JobItem) -> Result<u64, SourceError> {
        Ok(rand::thread_rng().gen_range(self.min_documents..=self.max_documents))
    }

    async fn fetch_document(&self, job: &JobItem, document_number: u64) -> Result<Bytes, SourceError> {
        if document_number == 0 {
            return Err(SourceError::FetchFailed {
                job_id: job.id,
                document_number,
                reason: "document numbers start at 1".to_string(),
            });
        }

        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }

        trace!(job_id = %job.id, document_number, "Simulated document fetched");
        Ok(Bytes::from(Self::payload(job, document_number)))
    }
}
