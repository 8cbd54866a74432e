use clap::{Args, ValueEnum};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricsMode {
    /// Serve `/metrics` for the duration of the run
    Pull,
    /// Push the registry to a push gateway once the run is over
    Push,
    Disabled,
}

/// Parameters used to config metrics exposition.
#[derive(Debug, Clone, Args)]
pub struct MetricsCliArgs {
    #[arg(env = "DOWNLOADER_METRICS_MODE", long, value_enum, default_value_t = MetricsMode::Pull)]
    pub metrics_mode: MetricsMode,

    /// The host the metrics endpoint listens on.
    #[arg(env = "DOWNLOADER_METRICS_HOST", long, default_value = "0.0.0.0")]
    pub metrics_host: String,

    /// The port the metrics endpoint listens on.
    #[arg(env = "DOWNLOADER_METRICS_PORT", long, default_value = "9100")]
    pub metrics_port: u16,

    /// Base url of the Prometheus push gateway.
    #[arg(env = "DOWNLOADER_PUSH_GATEWAY_URL", long)]
    pub push_gateway_url: Option<Url>,

    /// Value of the `job` grouping label when pushing.
    #[arg(env = "DOWNLOADER_PUSH_JOB_LABEL", long, default_value = "document_downloader")]
    pub push_job_label: String,
}
