use std::time::Duration;

use crate::cli::service::ServiceCliArgs;
use crate::WorkerError;

/// Parameters of the simulated document source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceParams {
    pub min_documents: u64,
    pub max_documents: u64,
    pub fetch_delay: Duration,
}

impl TryFrom<&ServiceCliArgs> for SourceParams {
    type Error = WorkerError;
    fn try_from(args: &ServiceCliArgs) -> Result<Self, Self::Error> {
        if args.min_documents > args.max_documents {
            return Err(WorkerError::ConfigError(format!(
                "min documents ({}) must not exceed max documents ({})",
                args.min_documents, args.max_documents
            )));
        }
        Ok(Self {
            min_documents: args.min_documents,
            max_documents: args.max_documents,
            fetch_delay: Duration::from_millis(args.fetch_delay_ms),
        })
    }
}
