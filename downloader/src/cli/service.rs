use clap::{ArgAction, Args};

#[derive(Debug, Clone, Args)]
pub struct ServiceCliArgs {
    /// Seconds after which a lease is considered stale.
    #[arg(env = "DOWNLOADER_STALE_LEASE_SECS", long, default_value = "600")]
    pub stale_lease_secs: u64,

    /// Also claim `processing` jobs whose lease is stale.
    #[arg(env = "DOWNLOADER_RECLAIM_ABANDONED", long, default_value_t = true, action = ArgAction::Set)]
    pub reclaim_abandoned: bool,

    /// Lower bound of the number of documents per job.
    #[arg(env = "DOWNLOADER_MIN_DOCUMENTS", long, default_value = "10")]
    pub min_documents: u64,

    /// Upper bound of the number of documents per job.
    #[arg(env = "DOWNLOADER_MAX_DOCUMENTS", long, default_value = "20")]
    pub max_documents: u64,

    /// Delay of each document fetch, in milliseconds.
    #[arg(env = "DOWNLOADER_FETCH_DELAY_MS", long, default_value = "500")]
    pub fetch_delay_ms: u64,
}
