pub mod error;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
pub use error::StorageError;

/// Trait defining object storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Put the data under `key` and return the location of the stored object
    async fn put_data(&self, data: Bytes, key: &str) -> Result<String, StorageError>;
}

/// Object key of a document: `{namespace}/{job_id}/document_{n}.txt`
pub fn document_key(namespace: &str, job_id: &uuid::Uuid, document_number: u64) -> String {
    format!(
        "{}/{}/{}",
        namespace.trim_end_matches('/'),
        job_id,
        crate::types::constant::document_file_name(document_number)
    )
}
