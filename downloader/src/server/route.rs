use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use prometheus::{Registry, TEXT_FORMAT};
use serde_json::json;
use tracing::error;

use crate::metrics::encode_text;

/// Handles 404 Not Found responses.
pub async fn handler_404() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "The requested resource was not found")
}

/// Current registry state in the prometheus text format
async fn metrics_handler(State(registry): State<Registry>) -> Response {
    match encode_text(&registry) {
        Ok(buffer) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], buffer).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode metrics").into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub(crate) fn server_router(registry: Registry) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .fallback(handler_404)
        .with_state(registry)
}
