use async_trait::async_trait;
use prometheus::{Registry, TEXT_FORMAT};
use reqwest::header::CONTENT_TYPE;
use std::net::SocketAddr;
use tracing::{debug, info};
use url::Url;

use crate::metrics::encode_text;
use crate::server::{setup_server, ServerHandle};
use crate::types::params::metrics::PushGatewayParams;
use crate::{WorkerError, WorkerResult};

/// Exposition strategy of the metric registry
#[async_trait]
pub trait MetricsExporter: Send + Sync {
    /// Called once before the claim
    async fn start(&mut self) -> WorkerResult<()>;

    /// Called once at the end of the run with the identity of this worker
    async fn publish(&self, worker_id: &str) -> WorkerResult<()>;

    /// Called once before the process exits
    async fn shutdown(&mut self) -> WorkerResult<()>;
}

/// Serves the registry over HTTP for the duration of the run
pub struct PullExporter {
    address: SocketAddr,
    registry: Registry,
    server: Option<(SocketAddr, ServerHandle)>,
}

impl PullExporter {
    pub fn new(address: SocketAddr, registry: Registry) -> Self {
        Self { address, registry, server: None }
    }

    /// Address the server is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(|(address, _)| *address)
    }
}

#[async_trait]
impl MetricsExporter for PullExporter {
    async fn start(&mut self) -> WorkerResult<()> {
        if self.server.is_none() {
            self.server = Some(setup_server(self.address, self.registry.clone()).await?);
        }
        Ok(())
    }

    async fn publish(&self, _worker_id: &str) -> WorkerResult<()> {
        // values are scraped
        Ok(())
    }

    async fn shutdown(&mut self) -> WorkerResult<()> {
        match self.server.take() {
            Some((_, handle)) => handle.shutdown().await,
            None => Ok(()),
        }
    }
}

/// Sends the registry to a Prometheus push gateway once the run is over
pub struct PushExporter {
    client: reqwest::Client,
    params: PushGatewayParams,
    registry: Registry,
}

impl PushExporter {
    pub fn new(params: PushGatewayParams, registry: Registry) -> Self {
        Self { client: reqwest::Client::new(), params, registry }
    }

    /// `{gateway}/metrics/job/{job_label}/instance/{worker_id}`
    pub fn grouping_url(&self, worker_id: &str) -> WorkerResult<Url> {
        let mut url = self.params.gateway_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                WorkerError::ConfigError(format!("Push gateway url {} cannot be a base", self.params.gateway_url))
            })?
            .pop_if_empty()
            .extend(["metrics", "job", self.params.job_label.as_str(), "instance", worker_id]);
        Ok(url)
    }
}

#[async_trait]
impl MetricsExporter for PushExporter {
    async fn start(&mut self) -> WorkerResult<()> {
        Ok(())
    }

    async fn publish(&self, worker_id: &str) -> WorkerResult<()> {
        let buffer = encode_text(&self.registry)?;

        let url = self.grouping_url(worker_id)?;
        debug!(url = %url, bytes = buffer.len(), "Pushing metrics");

        self.client
            .post(url.clone())
            .header(CONTENT_TYPE, TEXT_FORMAT)
            .body(buffer)
            .send()
            .await?
            .error_for_status()?;

        info!(url = %url, "Metrics pushed to gateway");
        Ok(())
    }

    async fn shutdown(&mut self) -> WorkerResult<()> {
        Ok(())
    }
}

/// Exporter of a worker running with metrics disabled. The registry still counts.
#[derive(Debug, Default)]
pub struct NoopExporter;

#[async_trait]
impl MetricsExporter for NoopExporter {
    async fn start(&mut self) -> WorkerResult<()> {
        Ok(())
    }

    async fn publish(&self, _worker_id: &str) -> WorkerResult<()> {
        Ok(())
    }

    async fn shutdown(&mut self) -> WorkerResult<()> {
        Ok(())
    }
}
