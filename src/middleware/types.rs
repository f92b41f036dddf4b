//! Types shared by wallet middleware implementations.

use serde::{Deserialize, Serialize};

/// Error types for wallet middleware operations
#[derive(Debug, thiserror::Error)]
pub enum MiddlewareError {
    #[error("wallet daemon error: {0}")]
    Daemon(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no data returned")]
    NoData,

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Receiver for blockchain sync progress notifications.
///
/// A listener is bound fresh for every sync attempt. The middleware reports
/// `sync_started` once, then any number of progress notifications, and finally
/// exactly one `sync_ended` carrying the terminal result of the attempt.
/// The three progress methods default to no-ops since not every consumer
/// cares about intermediate updates.
pub trait SyncProgressListener: Send + Sync {
    /// The sync attempt has started.
    fn sync_started(&self);

    /// Block header fetching progress, as a percentage.
    fn headers_fetched(&self, _percentage: i64) {}

    /// Address discovery progress description.
    fn address_discovered(&self, _state: &str) {}

    /// Block rescan progress, as a percentage.
    fn rescan_progress(&self, _percentage: i64) {}

    /// The sync attempt has ended. Called exactly once per attempt.
    fn sync_ended(&self, result: Result<(), MiddlewareError>);
}

/// Sync status snapshot reported by the wallet daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    /// The stage the daemon is currently in.
    pub stage: SyncStage,
    /// Percentage progress through the current stage.
    #[serde(default)]
    pub progress: i64,
    /// Optional human-readable detail for the current stage.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Stages of a blockchain sync as reported by the wallet daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStage {
    /// Fetching block headers.
    Headers,
    /// Discovering used addresses.
    AddressDiscovery,
    /// Rescanning blocks for wallet transactions.
    Rescan,
    /// Sync finished successfully.
    Synced,
    /// Sync ended with an error.
    Failed,
}
