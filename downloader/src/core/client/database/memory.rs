use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::DatabaseError;
use super::JobStore;
use crate::types::jobs::document::DocumentRecord;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::lease::ClaimPolicy;
use crate::types::jobs::types::JobStatus;

#[derive(Default)]
struct Collections {
    jobs: Vec<JobItem>,
    documents: Vec<DocumentRecord>,
}

/// Job store kept in process memory.
///
/// A single lock guards both collections, which makes `claim_job` atomic in the same way
/// `findOneAndUpdate` is for MongoDB. Only compiled for tests.
#[derive(Default)]
pub struct InMemoryJobStore {
    inner: Mutex<Collections>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the given jobs
    pub fn with_jobs(jobs: impl IntoIterator<Item = JobItem>) -> Self {
        Self { inner: Mutex::new(Collections { jobs: jobs.into_iter().collect(), documents: Vec::new() }) }
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create_job(&self, job: JobItem) -> Result<JobItem, DatabaseError> {
        let mut inner = self.inner.lock().await;
        if inner.jobs.iter().any(|existing| existing.id == job.id) {
            return Err(DatabaseError::ItemAlreadyExists(format!("Job already exists: {}", job.id)));
        }
        inner.jobs.push(job.clone());
        Ok(job)
    }

    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<JobItem>, DatabaseError> {
        Ok(self.inner.lock().await.jobs.iter().find(|job| job.id == id).cloned())
    }

    async fn count_jobs_by_status(&self, status: JobStatus) -> Result<u64, DatabaseError> {
        Ok(self.inner.lock().await.jobs.iter().filter(|job| job.job_status == status).count() as u64)
    }

    async fn claim_job(&self, policy: &ClaimPolicy, worker_id: &str) -> Result<Option<JobItem>, DatabaseError> {
        let now = Utc::now().trunc_subsecs(3);
        let mut inner = self.inner.lock().await;

        let Some(job) = inner
            .jobs
            .iter_mut()
            .filter(|job| policy.is_claimable(job, now))
            .min_by_key(|job| job.created_at)
        else {
            return Ok(None);
        };

        job.job_status = JobStatus::Processing;
        job.locked_by = Some(worker_id.to_string());
        job.locked_at = Some(now);
        job.attempts += 1;
        job.processing_stages.document_download.status = JobStatus::Processing;
        job.processing_stages.document_download.last_updated = Some(now);
        job.updated_at = now;

        Ok(Some(job.clone()))
    }

    async fn update_job(&self, id: Uuid, update: JobItemUpdates) -> Result<JobItem, DatabaseError> {
        if update.is_empty() {
            return Err(DatabaseError::NoUpdateFound("No field to be updated, likely a false call".to_string()));
        }

        let mut inner = self.inner.lock().await;
        let job = inner
            .jobs
            .iter_mut()
            .find(|job| job.id == id)
            .ok_or_else(|| DatabaseError::ItemNotFound(format!("Job {} not found", id)))?;

        update.apply(job, Utc::now().trunc_subsecs(3));
        Ok(job.clone())
    }

    async fn insert_document(&self, record: DocumentRecord) -> Result<(), DatabaseError> {
        self.inner.lock().await.documents.push(record);
        Ok(())
    }

    async fn get_documents_by_job_id(&self, job_id: Uuid) -> Result<Vec<DocumentRecord>, DatabaseError> {
        Ok(self.inner.lock().await.documents.iter().filter(|record| record.job_id == job_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn pending_jobs(count: usize) -> Vec<JobItem> {
        (0..count).map(|i| JobItem::create(format!("Company {i}"), format!("CIN{i}"))).collect()
    }

    #[rstest]
    #[case(3, 10)]
    #[case(10, 3)]
    #[case(5, 5)]
    #[tokio::test]
    async fn concurrent_claims_never_share_a_job(#[case] jobs: usize, #[case] workers: usize) {
        let store = Arc::new(InMemoryJobStore::with_jobs(pending_jobs(jobs)));
        let barrier = Arc::new(Barrier::new(workers));
        let policy = ClaimPolicy::default();

        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let store = store.clone();
                let barrier = barrier.clone();
                tokio::spawn(async move {
                    barrier.wait().await;
                    store.claim_job(&policy, &format!("worker-{worker}")).await.unwrap()
                })
            })
            .collect();

        let mut claimed = Vec::new();
        for handle in handles {
            if let Some(job) = handle.await.unwrap() {
                claimed.push(job.id);
            }
        }

        let distinct: HashSet<_> = claimed.iter().collect();
        assert_eq!(claimed.len(), jobs.min(workers));
        assert_eq!(distinct.len(), claimed.len());
    }

    #[rstest]
    #[tokio::test]
    async fn claim_takes_oldest_job_and_leases_it() {
        let mut older = JobItem::create("Old Co", "CIN-OLD");
        older.created_at -= chrono::Duration::seconds(60);
        let newer = JobItem::create("New Co", "CIN-NEW");
        let store = InMemoryJobStore::with_jobs([newer, older.clone()]);

        let job = store.claim_job(&ClaimPolicy::default(), "worker-1").await.unwrap().unwrap();

        assert_eq!(job.id, older.id);
        assert_eq!(job.job_status, JobStatus::Processing);
        assert_eq!(job.locked_by.as_deref(), Some("worker-1"));
        assert!(job.locked_at.is_some());
        assert_eq!(job.attempts, 1);
        assert_eq!(job.processing_stages.document_download.status, JobStatus::Processing);
        assert_eq!(store.get_job_by_id(older.id).await.unwrap(), Some(job));
    }

    #[rstest]
    #[tokio::test]
    async fn terminal_and_freshly_leased_jobs_are_not_claimed() {
        let mut completed = JobItem::create("Done Co", "CIN1");
        completed.job_status = JobStatus::Completed;
        let mut leased = JobItem::create("Busy Co", "CIN2");
        leased.locked_by = Some("worker-other".to_string());
        leased.locked_at = Some(Utc::now());
        let store = InMemoryJobStore::with_jobs([completed, leased]);

        assert_eq!(store.claim_job(&ClaimPolicy::default(), "worker-1").await.unwrap(), None);
    }

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    #[tokio::test]
    async fn abandoned_processing_job_reclaimed_per_policy(#[case] reclaim: bool, #[case] expect_claim: bool) {
        let mut abandoned = JobItem::create("Crashed Co", "CIN3");
        abandoned.job_status = JobStatus::Processing;
        abandoned.locked_by = Some("worker-dead".to_string());
        abandoned.locked_at = Some(Utc::now() - chrono::Duration::hours(1));
        abandoned.attempts = 1;
        let store = InMemoryJobStore::with_jobs([abandoned]);

        let policy = ClaimPolicy::new(Duration::from_secs(600), reclaim);
        let claimed = store.claim_job(&policy, "worker-new").await.unwrap();

        assert_eq!(claimed.is_some(), expect_claim);
        if let Some(job) = claimed {
            assert_eq!(job.locked_by.as_deref(), Some("worker-new"));
            assert_eq!(job.attempts, 2);
        }
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = InMemoryJobStore::new();
        let job = JobItem::create("Acme", "CIN");
        store.create_job(job.clone()).await.unwrap();

        assert_matches!(store.create_job(job).await, Err(DatabaseError::ItemAlreadyExists(_)));
    }

    #[rstest]
    #[tokio::test]
    async fn update_of_missing_job_fails() {
        let store = InMemoryJobStore::new();
        let update = JobItemUpdates::new().update_progress(10);

        assert_matches!(store.update_job(Uuid::new_v4(), update).await, Err(DatabaseError::ItemNotFound(_)));
    }
}
