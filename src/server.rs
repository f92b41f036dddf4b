//! Network-server run mode.
//!
//! Serves a small status endpoint for the opened wallet. The serve call
//! blocks until the session's cancel token fires, which is how this mode
//! participates in graceful shutdown: the interrupt listener cancels the
//! session, the server drains, and the call returns so the orchestrator can
//! signal shutdown.

use crate::middleware::WalletMiddleware;
use crate::session::CancelToken;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct ServerState {
    middleware: Arc<dyn WalletMiddleware>,
}

/// Serve wallet status until cancellation.
pub async fn run(
    cancel: CancelToken,
    middleware: Arc<dyn WalletMiddleware>,
    listen_address: &str,
) -> std::io::Result<()> {
    let app = Router::new()
        .route("/status", get(status))
        .with_state(ServerState { middleware });

    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    info!("status server listening on {}", listen_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
}

async fn status(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({
        "network": state.middleware.net_type(),
        "wallet": "open",
    }))
}
