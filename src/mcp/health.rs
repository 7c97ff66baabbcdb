//! Liveness endpoint served next to the HTTP transport.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::task::JoinHandle;

use super::server::SERVER_NAME;

/// Router with `GET /health`
pub fn router() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVER_NAME,
    }))
}

/// Bind `addr` and serve the health router in the background
pub async fn serve_health(addr: SocketAddr) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;
    tracing::info!("Health endpoint listening on http://{}/health", bound);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            tracing::error!("Health endpoint stopped: {}", e);
        }
    });

    Ok((bound, handle))
}
