use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::{chrono_datetime_as_bson_datetime, uuid_1_as_binary};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::jobs::types::JobStatus;
use crate::types::serde_helpers::optional_chrono_datetime_as_bson_datetime;

/// Progress of the document download stage, kept as a sub-document of the job
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    pub status: JobStatus,
    #[serde(default)]
    pub total_documents: Option<u64>,
    #[serde(default, with = "optional_chrono_datetime_as_bson_datetime")]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStages {
    #[serde(default)]
    pub document_download: StageProgress,
}

/// One unit of external work: download every document of a company.
///
/// Field names follow the `jobs` collection schema (camelCase), so records written
/// by other services deserialize without a mapping layer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JobItem {
    /// an uuid to identify a job
    #[serde(rename = "_id", with = "uuid_1_as_binary")]
    pub id: Uuid,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub cin: Option<String>,
    pub job_status: JobStatus,
    /// identity of the worker holding the lease
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<String>,
    /// when the lease was taken
    #[serde(default, skip_serializing_if = "Option::is_none", with = "optional_chrono_datetime_as_bson_datetime")]
    pub locked_at: Option<DateTime<Utc>>,
    /// number of times the job was claimed
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub total_documents: u64,
    #[serde(default)]
    pub uploaded_documents: u64,
    #[serde(default)]
    pub failed_documents: u64,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub processing_stages: ProcessingStages,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl JobItem {
    /// Creates a new pending job. Used to seed the store; jobs are normally created by other services.
    pub fn create(company_name: impl Into<String>, cin: impl Into<String>) -> Self {
        let now = Utc::now().round_subsecs(3);
        Self {
            id: Uuid::new_v4(),
            company_name: Some(company_name.into()),
            cin: Some(cin.into()),
            job_status: JobStatus::Pending,
            locked_by: None,
            locked_at: None,
            attempts: 0,
            total_documents: 0,
            uploaded_documents: 0,
            failed_documents: 0,
            progress: 0,
            processing_stages: ProcessingStages::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn company_name_or_unknown(&self) -> &str {
        self.company_name.as_deref().unwrap_or("Unknown")
    }

    pub fn cin_or_unknown(&self) -> &str {
        self.cin.as_deref().unwrap_or("Unknown")
    }

    pub fn is_leased(&self) -> bool {
        self.locked_by.is_some() || self.locked_at.is_some()
    }
}
