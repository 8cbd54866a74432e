use std::time::Duration;

use crate::cli::service::ServiceCliArgs;
use crate::cli::storage::aws_s3::AWSS3CliArgs;
use crate::types::jobs::lease::ClaimPolicy;
use crate::WorkerError;

#[derive(Debug, Clone)]
pub struct ServiceParams {
    pub claim_policy: ClaimPolicy,
    /// Prefix of every object key
    pub storage_namespace: String,
}

impl ServiceParams {
    pub fn new(claim_policy: ClaimPolicy, storage_namespace: impl Into<String>) -> Self {
        Self { claim_policy, storage_namespace: storage_namespace.into() }
    }

    pub fn from_cli_args(service_args: &ServiceCliArgs, storage_args: &AWSS3CliArgs) -> Result<Self, WorkerError> {
        if service_args.stale_lease_secs == 0 {
            return Err(WorkerError::ConfigError("Stale lease window must be at least one second".to_string()));
        }
        let namespace = storage_args.storage_namespace.trim_matches('/');
        if namespace.is_empty() {
            return Err(WorkerError::ConfigError("Storage namespace is empty".to_string()));
        }

        Ok(Self::new(
            ClaimPolicy::new(Duration::from_secs(service_args.stale_lease_secs), service_args.reclaim_abandoned),
            namespace,
        ))
    }
}
