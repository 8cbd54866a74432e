pub mod constant;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod mongodb;

use async_trait::async_trait;
pub use error::DatabaseError;
use uuid::Uuid;

use crate::types::jobs::document::DocumentRecord;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::lease::ClaimPolicy;
use crate::types::jobs::types::JobStatus;

/// Trait defining the job store operations used by the worker.
///
/// The store is the only synchronization point between workers: `claim_job` must select
/// and lease a job in one atomic operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// create_job - Insert a new job. Fails if a job with the same id exists.
    async fn create_job(&self, job: JobItem) -> Result<JobItem, DatabaseError>;

    /// get_job_by_id - Get a job by its ID
    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<JobItem>, DatabaseError>;

    /// count_jobs_by_status - Count jobs in the given status
    async fn count_jobs_by_status(&self, status: JobStatus) -> Result<u64, DatabaseError>;

    /// claim_job - Atomically select one job matching the claim policy and lease it to `worker_id`.
    ///
    /// The returned job is the post-update snapshot: `processing`, leased, `attempts` incremented.
    async fn claim_job(&self, policy: &ClaimPolicy, worker_id: &str) -> Result<Option<JobItem>, DatabaseError>;

    /// update_job - Apply an update to the job with the given id and return the updated job
    async fn update_job(&self, id: Uuid, update: JobItemUpdates) -> Result<JobItem, DatabaseError>;

    /// insert_document - Append a document outcome record
    async fn insert_document(&self, record: DocumentRecord) -> Result<(), DatabaseError>;

    /// get_documents_by_job_id - All document records of a job, in insertion order
    async fn get_documents_by_job_id(&self, job_id: Uuid) -> Result<Vec<DocumentRecord>, DatabaseError>;
}
