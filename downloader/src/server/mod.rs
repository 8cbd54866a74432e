pub mod route;

use prometheus::Registry;
use std::net::SocketAddr;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::server::route::server_router;
use crate::{WorkerError, WorkerResult};

/// Handle for managing the HTTP server lifecycle.
pub struct ServerHandle {
    shutdown_token: CancellationToken,
    task_handle: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Stops accepting connections, lets in-flight scrapes finish and waits for the server task.
    pub async fn shutdown(self) -> WorkerResult<()> {
        info!("Initiating metrics server graceful shutdown");
        self.shutdown_token.cancel();
        self.task_handle.await.map_err(|e| WorkerError::ServerError(e.to_string()))??;
        Ok(())
    }
}

/// Binds `address` and serves the metrics routes from a separate tokio task.
///
/// # Returns
/// * `(SocketAddr, ServerHandle)` - The bound address and handle for managing the server
pub async fn setup_server(address: SocketAddr, registry: Registry) -> WorkerResult<(SocketAddr, ServerHandle)> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    let bound_address = listener.local_addr()?;

    let shutdown_token = CancellationToken::new();
    let server_token = shutdown_token.clone();

    let app = server_router(registry);
    let task_handle = tokio::spawn(async move {
        axum::serve(listener, app).with_graceful_shutdown(server_token.cancelled_owned()).await
    });

    info!(address = %bound_address, "Metrics endpoint started");
    Ok((bound_address, ServerHandle { shutdown_token, task_handle }))
}
