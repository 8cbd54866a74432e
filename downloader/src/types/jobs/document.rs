use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::{chrono_datetime_as_bson_datetime, uuid_1_as_binary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::constant::document_file_name;
use crate::types::jobs::job_item::JobItem;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UploadStatus {
    Success,
    Failed,
    /// No object store is configured, the payload was not persisted
    Skipped,
}

/// Result of handling a single document unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Uploaded { location: String },
    Skipped,
    Failed { reason: String },
}

impl DocumentOutcome {
    pub fn upload_status(&self) -> UploadStatus {
        match self {
            DocumentOutcome::Uploaded { .. } => UploadStatus::Success,
            DocumentOutcome::Skipped => UploadStatus::Skipped,
            DocumentOutcome::Failed { .. } => UploadStatus::Failed,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DocumentOutcome::Failed { .. })
    }
}

/// Append-only record of one processed document, stored in the `documents` collection
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(rename = "_id", with = "uuid_1_as_binary")]
    pub id: Uuid,
    #[serde(with = "uuid_1_as_binary")]
    pub job_id: Uuid,
    pub document_number: u64,
    pub file_name: String,
    pub company_name: String,
    pub cin: String,
    /// claim attempt of the job that produced this record
    pub attempt: u32,
    pub upload_status: UploadStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn new(job: &JobItem, document_number: u64, outcome: &DocumentOutcome) -> Self {
        let (location, error) = match outcome {
            DocumentOutcome::Uploaded { location } => (Some(location.clone()), None),
            DocumentOutcome::Skipped => (None, None),
            DocumentOutcome::Failed { reason } => (None, Some(reason.clone())),
        };

        Self {
            id: Uuid::new_v4(),
            job_id: job.id,
            document_number,
            file_name: document_file_name(document_number),
            company_name: job.company_name_or_unknown().to_string(),
            cin: job.cin_or_unknown().to_string(),
            attempt: job.attempts,
            upload_status: outcome.upload_status(),
            location,
            error,
            created_at: Utc::now().round_subsecs(3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        DocumentOutcome::Uploaded { location: "s3://bucket/jobs/1/document_1.txt".into() },
        UploadStatus::Success,
        true,
        false
    )]
    #[case(DocumentOutcome::Failed { reason: "connection reset".into() }, UploadStatus::Failed, false, true)]
    #[case(DocumentOutcome::Skipped, UploadStatus::Skipped, false, false)]
    fn record_fields_follow_outcome(
        #[case] outcome: DocumentOutcome,
        #[case] status: UploadStatus,
        #[case] has_location: bool,
        #[case] has_error: bool,
    ) {
        let mut job = JobItem::create("Acme", "CIN42");
        job.attempts = 2;
        let record = DocumentRecord::new(&job, 7, &outcome);

        assert_eq!(record.job_id, job.id);
        assert_eq!(record.document_number, 7);
        assert_eq!(record.file_name, "document_7.txt");
        assert_eq!(record.attempt, 2);
        assert_eq!(record.upload_status, status);
        assert_eq!(record.location.is_some(), has_location);
        assert_eq!(record.error.is_some(), has_error);
    }
}
