use clap::Parser;

pub mod database;
pub mod metrics;
pub mod service;
pub mod storage;

pub use metrics::MetricsMode;

/// Claims one pending job, downloads its documents and exits.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct RunCmd {
    // Database
    #[clap(flatten)]
    pub mongodb_args: database::mongodb::MongoDBCliArgs,

    // Storage
    #[clap(flatten)]
    pub aws_s3_args: storage::aws_s3::AWSS3CliArgs,

    // Metrics
    #[clap(flatten)]
    pub metrics_args: metrics::MetricsCliArgs,

    // Service
    #[clap(flatten)]
    pub service_args: service::ServiceCliArgs,
}
