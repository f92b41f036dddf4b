//! JSON-RPC adapter for an external wallet daemon.
//!
//! This module implements `WalletMiddleware` against a wallet daemon exposing
//! a JSON-RPC endpoint over HTTP. Lifecycle operations map one-to-one onto
//! daemon methods; blockchain sync is started with one call and then driven by
//! polling the daemon's sync status, translating each status snapshot into the
//! corresponding `SyncProgressListener` notification.

use super::types::{MiddlewareError, SyncProgressListener, SyncStage, SyncStatus};
use super::WalletMiddleware;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Interval between sync status polls.
const SYNC_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wallet middleware backed by a wallet daemon's JSON-RPC interface
pub struct WalletRpcMiddleware {
    /// The underlying HTTP client for RPC requests.
    http_client: Client,
    /// The daemon's JSON-RPC endpoint.
    rpc_address: String,
    /// Network identifier, reported as-is in user-facing messages.
    net_type: String,
}

impl WalletRpcMiddleware {
    /// Create a new adapter for the daemon at `rpc_address`.
    pub fn new(rpc_address: String, net_type: String) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            rpc_address,
            net_type,
        }
    }

    /// Execute a JSON-RPC call and unwrap the daemon's response envelope.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, MiddlewareError> {
        debug!("wallet rpc call: {}", method);

        let request_body = json!({
            "jsonrpc": "1.0",
            "id": "walletctl",
            "method": method,
            "params": params,
        });

        let response = self
            .http_client
            .post(&self.rpc_address)
            .json(&request_body)
            .send()
            .await?;

        let body: serde_json::Value = response.json().await?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown wallet daemon error");
            return Err(MiddlewareError::Daemon(message.to_string()));
        }

        body.get("result").cloned().ok_or(MiddlewareError::NoData)
    }
}

#[async_trait::async_trait]
impl WalletMiddleware for WalletRpcMiddleware {
    async fn wallet_exists(&self) -> Result<bool, MiddlewareError> {
        let result = self.call("walletexists", json!([])).await?;
        result.as_bool().ok_or_else(|| {
            MiddlewareError::InvalidResponse("walletexists did not return a boolean".to_string())
        })
    }

    async fn open_wallet(&self) -> Result<(), MiddlewareError> {
        self.call("openwallet", json!([])).await?;
        Ok(())
    }

    async fn generate_seed(&self) -> Result<String, MiddlewareError> {
        let result = self.call("generatewalletseed", json!([])).await?;
        result
            .as_str()
            .map(|seed| seed.to_string())
            .ok_or_else(|| {
                MiddlewareError::InvalidResponse(
                    "generatewalletseed did not return a string".to_string(),
                )
            })
    }

    async fn create_wallet(&self, passphrase: &str, seed: &str) -> Result<(), MiddlewareError> {
        self.call("createwallet", json!([passphrase, seed])).await?;
        Ok(())
    }

    async fn sync_blockchain(
        &self,
        listener: Arc<dyn SyncProgressListener>,
        rescan: bool,
    ) -> Result<(), MiddlewareError> {
        // A failure to even start is reported through the return value; no
        // listener events are emitted for an attempt that never began.
        self.call("startblockchainsync", json!([rescan])).await?;
        listener.sync_started();

        let mut poll = tokio::time::interval(SYNC_POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            poll.tick().await;

            let raw_status = match self.call("syncstatus", json!([])).await {
                Ok(value) => value,
                Err(e) => {
                    listener.sync_ended(Err(e));
                    return Ok(());
                }
            };

            let status: SyncStatus = match serde_json::from_value(raw_status) {
                Ok(status) => status,
                Err(e) => {
                    listener.sync_ended(Err(e.into()));
                    return Ok(());
                }
            };

            match status.stage {
                SyncStage::Headers => listener.headers_fetched(status.progress),
                SyncStage::AddressDiscovery => {
                    listener.address_discovered(status.detail.as_deref().unwrap_or("in progress"));
                }
                SyncStage::Rescan => listener.rescan_progress(status.progress),
                SyncStage::Synced => {
                    listener.sync_ended(Ok(()));
                    return Ok(());
                }
                SyncStage::Failed => {
                    let detail = status
                        .detail
                        .unwrap_or_else(|| "sync failed without detail".to_string());
                    listener.sync_ended(Err(MiddlewareError::Daemon(detail)));
                    return Ok(());
                }
            }
        }
    }

    async fn close_wallet(&self) {
        if let Err(e) = self.call("closewallet", json!([])).await {
            warn!("failed to close wallet cleanly: {}", e);
        }
    }

    fn net_type(&self) -> &str {
        &self.net_type
    }
}
