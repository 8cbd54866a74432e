use clap::Parser as _;
use dotenvy::dotenv;
use downloader::cli::RunCmd;
use downloader::core::config::Config;
use downloader::metrics::MetricsReporter;
use downloader::types::constant::{DOWNLOADER_VERSION, EXIT_INFRASTRUCTURE_ERROR};
use downloader::types::params::MetricsConfig;
use downloader::types::worker_id::WorkerIdentity;
use downloader::utils::logging::init_logging;
use downloader::worker::{RunOutcome, WorkerDriver};
use downloader::WorkerResult;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// Claim at most one job, process it and exit
#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    if let Err(e) = init_logging() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Failed to initialize logging: {e}");
        }
        return ExitCode::from(EXIT_INFRASTRUCTURE_ERROR);
    }

    let run_cmd = RunCmd::parse();
    info!(version = DOWNLOADER_VERSION, "Starting downloader");

    match run_downloader(&run_cmd).await {
        Ok(outcome) => {
            info!(outcome = %outcome, "Downloader finished");
            ExitCode::from(outcome.exit_code())
        }
        Err(e) => {
            error!(error = %e, error_chain = ?e, "Downloader aborted");
            ExitCode::from(EXIT_INFRASTRUCTURE_ERROR)
        }
    }
}

async fn run_downloader(run_cmd: &RunCmd) -> WorkerResult<RunOutcome> {
    let metrics_config = MetricsConfig::try_from(run_cmd.metrics_args.clone())?;
    let config = Arc::new(Config::from_run_cmd(run_cmd).await?);

    let reporter = MetricsReporter::from_config(&metrics_config, config.metrics());
    let identity = WorkerIdentity::current();

    WorkerDriver::new(config, reporter).run(&identity).await
}
