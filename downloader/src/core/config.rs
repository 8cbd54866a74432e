use std::sync::Arc;
use tracing::{debug, warn};

use crate::cli::RunCmd;
use crate::core::client::{
    AWSS3, DocumentSource, JobStore, MongoJobStore, SimulatedDocumentSource, StorageClient,
};
use crate::metrics::WorkerMetrics;
use crate::types::params::{MongoConfig, S3Config, ServiceParams, SourceParams};
use crate::WorkerResult;

/// The app config: validated parameters and the clients the worker is built from.
pub struct Config {
    /// Claim policy and key namespace
    params: ServiceParams,
    /// The job store
    database: Box<dyn JobStore>,
    /// Object store, absent when no bucket is configured
    storage: Option<Box<dyn StorageClient>>,
    /// Where documents come from
    source: Box<dyn DocumentSource>,
    metrics: Arc<WorkerMetrics>,
}

impl Config {
    pub fn new(
        params: ServiceParams,
        database: Box<dyn JobStore>,
        storage: Option<Box<dyn StorageClient>>,
        source: Box<dyn DocumentSource>,
        metrics: Arc<WorkerMetrics>,
    ) -> Self {
        Self { params, database, storage, source, metrics }
    }

    /// Validates every argument before connecting to anything, then builds the clients.
    pub async fn from_run_cmd(run_cmd: &RunCmd) -> WorkerResult<Self> {
        let db: MongoConfig = run_cmd.mongodb_args.clone().try_into()?;
        let params = ServiceParams::from_cli_args(&run_cmd.service_args, &run_cmd.aws_s3_args)?;
        let source_params = SourceParams::try_from(&run_cmd.service_args)?;
        let s3_config = S3Config::from_cli_args(&run_cmd.aws_s3_args);

        let database = Self::build_database_client(&db).await?;
        let storage = match &s3_config {
            Some(s3_config) => Some(Self::build_storage_client(s3_config).await?),
            None => {
                warn!("No bucket configured, document uploads will be skipped");
                None
            }
        };
        let source: Box<dyn DocumentSource> = Box::new(SimulatedDocumentSource::from_params(&source_params)?);
        let metrics = Arc::new(WorkerMetrics::new()?);

        debug!(
            database = %db.database_name,
            bucket = ?s3_config.as_ref().map(|c| c.bucket_name.as_str()),
            stale_after_secs = params.claim_policy.stale_after.as_secs(),
            reclaim_abandoned = params.claim_policy.reclaim_abandoned,
            "Configuration initialized"
        );

        Ok(Self::new(params, database, storage, source, metrics))
    }

    async fn build_database_client(db_config: &MongoConfig) -> WorkerResult<Box<dyn JobStore>> {
        let store = MongoJobStore::new(db_config).await?;
        store.health_check().await?;
        store.create_indexes().await?;
        Ok(Box::new(store))
    }

    async fn build_storage_client(s3_config: &S3Config) -> WorkerResult<Box<dyn StorageClient>> {
        let storage = AWSS3::create(s3_config).await?;
        storage.health_check().await?;
        Ok(Box::new(storage))
    }

    pub fn params(&self) -> &ServiceParams {
        &self.params
    }

    pub fn database(&self) -> &dyn JobStore {
        self.database.as_ref()
    }

    pub fn storage(&self) -> Option<&dyn StorageClient> {
        self.storage.as_deref()
    }

    pub fn source(&self) -> &dyn DocumentSource {
        self.source.as_ref()
    }

    pub fn metrics(&self) -> Arc<WorkerMetrics> {
        self.metrics.clone()
    }
}
