use assert_matches::assert_matches;
use bytes::Bytes;
use httpmock::prelude::*;
use rstest::rstest;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

use crate::core::client::source::MockDocumentSource;
use crate::core::client::storage::{MockStorageClient, StorageError};
use crate::core::client::database::memory::InMemoryJobStore;
use crate::error::{JobError, WorkerError};
use crate::metrics::{MetricsReporter, NoopExporter};
use crate::tests::config::TestConfigBuilder;
use crate::tests::faulty_store::FaultyJobStore;
use crate::types::jobs::document::UploadStatus;
use crate::types::jobs::job_item::JobItem;
use crate::types::jobs::lease::ClaimPolicy;
use crate::types::jobs::types::JobStatus;
use crate::types::params::metrics::PushGatewayParams;
use crate::types::params::MetricsConfig;
use crate::types::worker_id::WorkerIdentity;
use crate::worker::{RunOutcome, WorkerDriver};

fn driver(config: Arc<crate::core::config::Config>) -> WorkerDriver {
    let reporter = MetricsReporter::new(config.metrics(), Box::new(NoopExporter));
    WorkerDriver::new(config, reporter)
}

/// Two documents, the second upload fails
#[rstest]
#[tokio::test]
async fn second_upload_failing_ends_partial_failed() {
    let job = JobItem::create("J1 Industries", "J1CIN");

    let mut source = MockDocumentSource::new();
    source.expect_document_count().returning(|_| Ok(2));
    source.expect_fetch_document().returning(|job, n| {
        Ok(Bytes::from(format!("Document {} for {}", n, job.company_name_or_unknown())))
    });

    let mut storage = MockStorageClient::new();
    storage
        .expect_put_data()
        .withf(|_, key| key.ends_with("document_2.txt"))
        .returning(|_, _| Err(StorageError::InvalidKey("connection reset by peer".to_string())));
    storage.expect_put_data().returning(|_, key| Ok(format!("s3://filesure-documents/{key}")));

    let config = TestConfigBuilder::new()
        .with_jobs([job.clone()])
        .configure_source(source)
        .configure_storage(storage)
        .build();
    let mut driver = driver(config.clone());

    let outcome = driver.run(&WorkerIdentity::current()).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Finished {
            job_id: job.id,
            status: JobStatus::PartialFailed,
            total: 2,
            uploaded: 1,
            failed: 1,
            skipped: 0
        }
    );
    assert_eq!(outcome.exit_code(), 0);

    let stored = config.database().get_job_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.job_status, JobStatus::PartialFailed);
    assert_eq!((stored.total_documents, stored.uploaded_documents, stored.failed_documents), (2, 1, 1));
    assert_eq!(stored.progress, 100);
    assert!(!stored.is_leased());

    let records = config.database().get_documents_by_job_id(job.id).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].upload_status, UploadStatus::Success);
    assert_eq!(records[0].location, Some(format!("s3://filesure-documents/jobs/{}/document_1.txt", job.id)));
    assert!(records[0].error.is_none());
    assert_eq!(records[1].upload_status, UploadStatus::Failed);
    assert!(records[1].location.is_none());
    assert!(records[1].error.as_deref().is_some_and(|e| e.contains("connection reset by peer")));

    let metrics = config.metrics();
    assert_eq!(metrics.jobs_processed_total.with_label_values(&["partial_failed"]).get(), 1);
    assert_eq!(metrics.documents_uploaded_total.get(), 1);
    assert_eq!(metrics.blob_upload_failures_total.get(), 1);
    assert_eq!(metrics.active_jobs.get(), 0);
    assert_eq!(metrics.job_processing_duration_seconds.get_sample_count(), 1);
}

#[rstest]
#[tokio::test]
async fn empty_store_is_no_work() {
    let config = TestConfigBuilder::new().build();

    let outcome = driver(config.clone()).run(&WorkerIdentity::current()).await.unwrap();

    assert_eq!(outcome, RunOutcome::NoWork);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(config.metrics().job_processing_duration_seconds.get_sample_count(), 0);
}

#[rstest]
#[tokio::test]
async fn unsizable_document_set_fails_the_job() {
    let job = JobItem::create("Acme", "CIN1");
    let mut source = MockDocumentSource::new();
    source.expect_document_count().returning(|job| {
        Err(crate::core::client::source::SourceError::CountUnavailable {
            job_id: job.id,
            reason: "upstream returned 503".to_string(),
        })
    });

    let config = TestConfigBuilder::new().with_jobs([job.clone()]).configure_source(source).build();
    let outcome = driver(config.clone()).run(&WorkerIdentity::current()).await.unwrap();

    assert_eq!(outcome.exit_code(), 1);
    let stored = config.database().get_job_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.job_status, JobStatus::Failed);
    assert!(!stored.is_leased());
    assert!(config.database().get_documents_by_job_id(job.id).await.unwrap().is_empty());
    assert_eq!(config.metrics().jobs_failed_total.get(), 1);
}

#[rstest]
#[tokio::test]
async fn without_object_store_every_document_is_skipped() {
    let job = JobItem::create("Acme", "CIN1");
    let config = TestConfigBuilder::new().with_jobs([job.clone()]).build();

    let outcome = driver(config.clone()).run(&WorkerIdentity::current()).await.unwrap();

    let RunOutcome::Finished { status, total, skipped, uploaded, failed, .. } = outcome else {
        panic!("expected a finished run, got {outcome:?}");
    };
    assert_eq!(status, JobStatus::Completed);
    assert_eq!((uploaded, failed, skipped), (0, 0, total));

    let records = config.database().get_documents_by_job_id(job.id).await.unwrap();
    assert_eq!(records.len() as u64, total);
    assert!(records.iter().all(|record| record.upload_status == UploadStatus::Skipped));
}

#[rstest]
#[case(3, 6)]
#[case(6, 3)]
#[tokio::test]
async fn concurrent_drivers_process_each_job_once(#[case] jobs: usize, #[case] workers: usize) {
    let config = TestConfigBuilder::new()
        .with_jobs((0..jobs).map(|i| JobItem::create(format!("Company {i}"), format!("CIN{i}"))))
        .build();
    let barrier = Arc::new(Barrier::new(workers));

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let driver = driver(config.clone());
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                driver.run_once(&WorkerIdentity::current()).await.unwrap()
            })
        })
        .collect();

    let mut processed = Vec::new();
    for handle in handles {
        if let RunOutcome::Finished { job_id, .. } = handle.await.unwrap() {
            processed.push(job_id);
        }
    }

    assert_eq!(processed.len(), jobs.min(workers));
    assert_eq!(processed.iter().collect::<HashSet<_>>().len(), processed.len());

    // Every processed job has exactly as many records as documents
    for job_id in processed {
        let job = config.database().get_job_by_id(job_id).await.unwrap().unwrap();
        let records = config.database().get_documents_by_job_id(job_id).await.unwrap();
        assert!(job.job_status.is_terminal());
        assert_eq!(records.len() as u64, job.total_documents);
    }
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
#[tokio::test]
async fn abandoned_job_follows_reclaim_policy(#[case] reclaim_abandoned: bool, #[case] expect_no_work: bool) {
    let mut abandoned = JobItem::create("Crashed Co", "CIN9");
    abandoned.job_status = JobStatus::Processing;
    abandoned.locked_by = Some("worker-gone".to_string());
    abandoned.locked_at = Some(chrono::Utc::now() - chrono::Duration::hours(1));
    abandoned.attempts = 1;

    let config = TestConfigBuilder::new()
        .with_jobs([abandoned.clone()])
        .configure_claim_policy(ClaimPolicy::new(Duration::from_secs(600), reclaim_abandoned))
        .build();

    let outcome = driver(config.clone()).run(&WorkerIdentity::current()).await.unwrap();

    assert_eq!(outcome == RunOutcome::NoWork, expect_no_work);
    let stored = config.database().get_job_by_id(abandoned.id).await.unwrap().unwrap();
    if reclaim_abandoned {
        assert!(stored.job_status.is_terminal());
        assert_eq!(stored.attempts, 2);
    } else {
        assert_eq!(stored.job_status, JobStatus::Processing);
        assert_eq!(stored.locked_by.as_deref(), Some("worker-gone"));
    }
}

/// Five documents, the store goes away on the third record
#[rstest]
#[tokio::test]
async fn lost_record_write_fails_job_with_recorded_counts() {
    let job = JobItem::create("Acme", "CIN1");
    let store = FaultyJobStore::new(InMemoryJobStore::with_jobs([job.clone()])).fail_insert_at(3);

    let mut source = MockDocumentSource::new();
    source.expect_document_count().returning(|_| Ok(5));
    source.expect_fetch_document().returning(|_, n| Ok(Bytes::from(format!("document {n}"))));
    let mut storage = MockStorageClient::new();
    storage.expect_put_data().returning(|_, key| Ok(format!("s3://filesure-documents/{key}")));

    let config = TestConfigBuilder::new()
        .configure_database(store)
        .configure_source(source)
        .configure_storage(storage)
        .build();

    let outcome = driver(config.clone()).run(&WorkerIdentity::current()).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Finished { job_id: job.id, status: JobStatus::Failed, total: 5, uploaded: 2, failed: 0, skipped: 0 }
    );
    assert_eq!(outcome.exit_code(), 1);

    let stored = config.database().get_job_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.job_status, JobStatus::Failed);
    assert_eq!((stored.total_documents, stored.uploaded_documents, stored.failed_documents), (5, 2, 0));
    assert!(!stored.is_leased());
    assert_eq!(config.database().get_documents_by_job_id(job.id).await.unwrap().len(), 2);
    assert_eq!(config.metrics().documents_per_job.get_sample_sum(), 5.0);
}

#[rstest]
#[tokio::test]
async fn metrics_are_pushed_when_the_terminal_write_fails() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path_contains("/metrics/job/document_downloader/instance/")
                .body_contains("active_jobs 0");
            then.status(200);
        })
        .await;

    let job = JobItem::create("Acme", "CIN1");
    let store = FaultyJobStore::new(InMemoryJobStore::with_jobs([job.clone()])).fail_release();
    let config = TestConfigBuilder::new().configure_database(store).build();
    let push = MetricsConfig::Push(PushGatewayParams {
        gateway_url: url::Url::parse(&server.base_url()).unwrap(),
        job_label: "document_downloader".to_string(),
    });
    let reporter = MetricsReporter::from_config(&push, config.metrics());

    let result = WorkerDriver::new(config.clone(), reporter).run(&WorkerIdentity::current()).await;

    assert_matches!(result, Err(WorkerError::JobError(JobError::DatabaseError(_))));
    mock.assert_async().await;
    let stored = config.database().get_job_by_id(job.id).await.unwrap().unwrap();
    assert!(stored.is_leased());
}
