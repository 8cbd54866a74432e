use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use super::constant::{DOCUMENTS_COLLECTION, JOBS_COLLECTION};
use super::error::DatabaseError;
use super::JobStore;
use crate::types::jobs::document::DocumentRecord;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::job_updates::JobItemUpdates;
use crate::types::jobs::lease::ClaimPolicy;
use crate::types::jobs::types::JobStatus;
use crate::types::params::database::MongoConfig;

/// MongoDB job store
pub struct MongoJobStore {
    database: Arc<Database>,
}

impl MongoJobStore {
    pub async fn new(config: &MongoConfig) -> Result<Self, DatabaseError> {
        let client = Client::with_uri_str(&config.connection_url).await?;
        let database = Arc::new(client.database(&config.database_name));
        Ok(Self { database })
    }

    fn jobs_collection(&self) -> Collection<JobItem> {
        self.database.collection(JOBS_COLLECTION)
    }

    fn documents_collection(&self) -> Collection<DocumentRecord> {
        self.database.collection(DOCUMENTS_COLLECTION)
    }

    /// Creates the indexes the claim query and the document lookups rely on. Idempotent.
    pub async fn create_indexes(&self) -> Result<(), DatabaseError> {
        let claim_index = IndexModel::builder()
            .keys(doc! { "jobStatus": 1, "lockedAt": 1, "createdAt": 1 })
            .options(IndexOptions::builder().name("claim_lookup".to_string()).build())
            .build();
        self.jobs_collection().create_index(claim_index, None).await?;

        let documents_index = IndexModel::builder()
            .keys(doc! { "jobId": 1, "documentNumber": 1 })
            .options(IndexOptions::builder().name("job_documents".to_string()).build())
            .build();
        self.documents_collection().create_index(documents_index, None).await?;

        debug!("MongoDB indexes ensured");
        Ok(())
    }

    /// Ping the database
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Filter matching jobs the policy allows to claim at `now`
    pub(crate) fn claim_filter(policy: &ClaimPolicy, now: DateTime<Utc>) -> Result<Document, DatabaseError> {
        let cutoff = bson::DateTime::from_chrono(policy.cutoff(now));

        let pending = doc! {
            "jobStatus": bson::to_bson(&JobStatus::Pending)?,
            "$or": [
                { "lockedAt": { "$exists": false } },
                { "lockedAt": null },
                { "lockedAt": { "$lt": cutoff } },
            ]
        };

        if !policy.reclaim_abandoned {
            return Ok(pending);
        }

        let abandoned = doc! {
            "jobStatus": bson::to_bson(&JobStatus::Processing)?,
            "lockedAt": { "$lt": cutoff },
        };

        Ok(doc! { "$or": [pending, abandoned] })
    }

    /// Update document that leases a job to `worker_id`
    pub(crate) fn claim_update(worker_id: &str, now: DateTime<Utc>) -> Result<Document, DatabaseError> {
        let now = bson::DateTime::from_chrono(now);
        Ok(doc! {
            "$set": {
                "jobStatus": bson::to_bson(&JobStatus::Processing)?,
                "processingStages.documentDownload.status": bson::to_bson(&JobStatus::Processing)?,
                "processingStages.documentDownload.lastUpdated": now,
                "lockedBy": worker_id,
                "lockedAt": now,
                "updatedAt": now,
            },
            "$inc": { "attempts": 1 }
        })
    }

    /// Translate a [JobItemUpdates] into a `$set`/`$unset` update document
    pub(crate) fn update_document(update: &JobItemUpdates, now: DateTime<Utc>) -> Result<Document, DatabaseError> {
        let now = bson::DateTime::from_chrono(now);
        let mut set_doc = Document::new();

        if let Some(status) = update.job_status {
            set_doc.insert("jobStatus", bson::to_bson(&status)?);
        }
        if let Some(total) = update.total_documents {
            set_doc.insert("totalDocuments", bson::to_bson(&total)?);
            set_doc.insert("processingStages.documentDownload.totalDocuments", bson::to_bson(&total)?);
        }
        if let Some(uploaded) = update.uploaded_documents {
            set_doc.insert("uploadedDocuments", bson::to_bson(&uploaded)?);
        }
        if let Some(failed) = update.failed_documents {
            set_doc.insert("failedDocuments", bson::to_bson(&failed)?);
        }
        if let Some(progress) = update.progress {
            set_doc.insert("progress", bson::to_bson(&progress)?);
        }
        if let Some(stage_status) = update.stage_status {
            set_doc.insert("processingStages.documentDownload.status", bson::to_bson(&stage_status)?);
        }
        if update.touches_stage() {
            set_doc.insert("processingStages.documentDownload.lastUpdated", now);
        }
        set_doc.insert("updatedAt", now);

        let mut update_doc = doc! { "$set": set_doc };
        if update.clear_lease {
            update_doc.insert("$unset", doc! { "lockedBy": "", "lockedAt": "" });
        }

        Ok(update_doc)
    }
}

#[async_trait]
impl JobStore for MongoJobStore {
    async fn create_job(&self, job: JobItem) -> Result<JobItem, DatabaseError> {
        let start = Instant::now();
        let existing = self.jobs_collection().find_one(doc! { "_id": job.id }, None).await?;
        if existing.is_some() {
            return Err(DatabaseError::ItemAlreadyExists(format!("Job already exists: {}", job.id)));
        }

        self.jobs_collection().insert_one(&job, None).await?;
        debug!(job_id = %job.id, duration_ms = %start.elapsed().as_millis(), "Job created in MongoDB");
        Ok(job)
    }

    async fn get_job_by_id(&self, id: Uuid) -> Result<Option<JobItem>, DatabaseError> {
        Ok(self.jobs_collection().find_one(doc! { "_id": id }, None).await?)
    }

    async fn count_jobs_by_status(&self, status: JobStatus) -> Result<u64, DatabaseError> {
        let filter = doc! { "jobStatus": bson::to_bson(&status)? };
        Ok(self.jobs_collection().count_documents(filter, None).await?)
    }

    async fn claim_job(&self, policy: &ClaimPolicy, worker_id: &str) -> Result<Option<JobItem>, DatabaseError> {
        let start = Instant::now();
        let now = Utc::now().trunc_subsecs(3);

        let filter = Self::claim_filter(policy, now)?;
        let update = Self::claim_update(worker_id, now)?;

        // Oldest job first
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .sort(doc! { "createdAt": 1 })
            .build();

        let result = self.jobs_collection().find_one_and_update(filter, update, options).await?;

        if let Some(ref job) = result {
            debug!(
                job_id = %job.id,
                worker_id = worker_id,
                attempts = job.attempts,
                duration_ms = %start.elapsed().as_millis(),
                "Claimed job"
            );
        }

        Ok(result)
    }

    async fn update_job(&self, id: Uuid, update: JobItemUpdates) -> Result<JobItem, DatabaseError> {
        if update.is_empty() {
            return Err(DatabaseError::NoUpdateFound("No field to be updated, likely a false call".to_string()));
        }

        let update_doc = Self::update_document(&update, Utc::now().trunc_subsecs(3))?;
        let options = FindOneAndUpdateOptions::builder().return_document(ReturnDocument::After).build();

        self.jobs_collection().find_one_and_update(doc! { "_id": id }, update_doc, options).await?.ok_or_else(|| {
            warn!(job_id = %id, "Failed to update job, job not found");
            DatabaseError::ItemNotFound(format!("Job {} not found", id))
        })
    }

    async fn insert_document(&self, record: DocumentRecord) -> Result<(), DatabaseError> {
        self.documents_collection().insert_one(&record, None).await?;
        Ok(())
    }

    async fn get_documents_by_job_id(&self, job_id: Uuid) -> Result<Vec<DocumentRecord>, DatabaseError> {
        let options = FindOptions::builder().sort(doc! { "attempt": 1, "documentNumber": 1 }).build();
        let cursor = self.documents_collection().find(doc! { "jobId": job_id }, options).await?;
        Ok(cursor.try_collect().await?)
    }
}
