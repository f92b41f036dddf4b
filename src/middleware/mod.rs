//! Wallet middleware abstraction
//!
//! The middleware is the external wallet engine this program orchestrates but
//! does not implement: key derivation, transaction construction, and the
//! network sync protocol all live behind this seam. The session code only
//! depends on the `WalletMiddleware` trait; `rpc` provides the concrete
//! adapter that talks to a wallet daemon over JSON-RPC.

/// JSON-RPC adapter for an external wallet daemon
mod rpc;
/// Shared middleware types and the sync listener seam
mod types;

pub use rpc::WalletRpcMiddleware;
pub use types::*;

use std::sync::Arc;

/// Capability set of the external wallet engine.
///
/// Calls into the middleware may block arbitrarily long (for example when a
/// concurrent instance holds the wallet lock), so callers wrap them in spawned
/// tasks and race them against cancellation. Cancellation is cooperative: a
/// caller that gives up waiting does not terminate the underlying call.
#[async_trait::async_trait]
pub trait WalletMiddleware: Send + Sync {
    /// Check whether a wallet exists for the configured network.
    async fn wallet_exists(&self) -> Result<bool, MiddlewareError>;

    /// Open the existing wallet.
    async fn open_wallet(&self) -> Result<(), MiddlewareError>;

    /// Generate a new wallet recovery seed without creating a wallet.
    async fn generate_seed(&self) -> Result<String, MiddlewareError>;

    /// Finalize wallet creation with the supplied passphrase and seed.
    async fn create_wallet(&self, passphrase: &str, seed: &str) -> Result<(), MiddlewareError>;

    /// Start a blockchain sync, reporting progress through `listener`.
    ///
    /// Returns an error only when the sync fails to start; once started, the
    /// terminal outcome is delivered through `SyncProgressListener::sync_ended`.
    async fn sync_blockchain(
        &self,
        listener: Arc<dyn SyncProgressListener>,
        rescan: bool,
    ) -> Result<(), MiddlewareError>;

    /// Release the opened wallet. Cleanup only, best effort.
    async fn close_wallet(&self);

    /// Network identifier, used only for user-facing messages.
    fn net_type(&self) -> &str;
}
