pub mod error;
pub mod simulated;

use async_trait::async_trait;
use bytes::Bytes;
pub use error::SourceError;

use crate::types::jobs::job_item::JobItem;

/// Trait defining where the documents of a job come from.
///
/// Document numbers are 1-based and dense: a job with `document_count` N has documents `1..=N`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Number of documents available for the job
    async fn document_count(&self, job: &JobItem) -> Result<u64, SourceError>;

    /// Payload of one document
    async fn fetch_document(&self, job: &JobItem, document_number: u64) -> Result<Bytes, SourceError>;
}
