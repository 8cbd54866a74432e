use std::net::SocketAddr;
use url::Url;

use crate::cli::metrics::{MetricsCliArgs, MetricsMode};
use crate::WorkerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushGatewayParams {
    pub gateway_url: Url,
    pub job_label: String,
}

/// Validated metrics exposition settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsConfig {
    Pull { address: SocketAddr },
    Push(PushGatewayParams),
    Disabled,
}

impl TryFrom<MetricsCliArgs> for MetricsConfig {
    type Error = WorkerError;
    fn try_from(args: MetricsCliArgs) -> Result<Self, Self::Error> {
        match args.metrics_mode {
            MetricsMode::Pull => {
                let address = format!("{}:{}", args.metrics_host, args.metrics_port);
                let address = address
                    .parse::<SocketAddr>()
                    .map_err(|e| WorkerError::ConfigError(format!("Invalid metrics address {}: {}", address, e)))?;
                Ok(Self::Pull { address })
            }
            MetricsMode::Push => {
                let gateway_url = args.push_gateway_url.ok_or_else(|| {
                    WorkerError::ConfigError("Push gateway url is required when metrics mode is push".to_string())
                })?;
                if args.push_job_label.trim().is_empty() {
                    return Err(WorkerError::ConfigError("Push job label is empty".to_string()));
                }
                Ok(Self::Push(PushGatewayParams { gateway_url, job_label: args.push_job_label }))
            }
            MetricsMode::Disabled => Ok(Self::Disabled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn args(mode: MetricsMode, gateway: Option<&str>) -> MetricsCliArgs {
        MetricsCliArgs {
            metrics_mode: mode,
            metrics_host: "127.0.0.1".to_string(),
            metrics_port: 9100,
            push_gateway_url: gateway.map(|url| Url::parse(url).unwrap()),
            push_job_label: "document_downloader".to_string(),
        }
    }

    #[rstest]
    fn pull_mode_resolves_socket_address() {
        let config = MetricsConfig::try_from(args(MetricsMode::Pull, None)).unwrap();
        assert_eq!(config, MetricsConfig::Pull { address: "127.0.0.1:9100".parse().unwrap() });
    }

    #[rstest]
    fn push_mode_requires_gateway() {
        assert_matches!(MetricsConfig::try_from(args(MetricsMode::Push, None)), Err(WorkerError::ConfigError(_)));
        assert_matches!(
            MetricsConfig::try_from(args(MetricsMode::Push, Some("http://gateway:9091"))),
            Ok(MetricsConfig::Push(_))
        );
    }

    #[rstest]
    fn invalid_host_is_a_config_error() {
        let mut cli_args = args(MetricsMode::Pull, None);
        cli_args.metrics_host = "not a host".to_string();
        assert_matches!(MetricsConfig::try_from(cli_args), Err(WorkerError::ConfigError(_)));
    }
}
