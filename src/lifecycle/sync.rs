//! Blockchain sync driver.
//!
//! A sync attempt runs the middleware call on a spawned task with a fresh
//! terminal listener; the listener forwards the attempt's single terminal
//! result over a channel, and the caller races that channel against the
//! session's cancel token. A sync that fails to even start is reported
//! through the same channel as any other terminal error.

use super::{LifecycleError, LifecycleStep, WalletLifecycleManager};
use crate::middleware::{MiddlewareError, SyncProgressListener};
use crate::session::CancelToken;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

impl WalletLifecycleManager {
    /// Run a blockchain sync to completion, racing it against cancellation.
    ///
    /// Returns the cancellation error if the session is torn down first; the
    /// abandoned sync task is not aborted and may keep running until process
    /// exit.
    pub async fn sync_blockchain(&self, cancel: &CancelToken) -> Result<(), LifecycleError> {
        let (done_tx, mut done_rx) = mpsc::channel::<Result<(), MiddlewareError>>(1);
        let listener = Arc::new(TerminalSyncListener {
            done: done_tx.clone(),
        });

        let middleware = Arc::clone(&self.middleware);
        tokio::spawn(async move {
            if let Err(e) = middleware.sync_blockchain(listener, true).await {
                eprintln!("Blockchain sync failed to start: {e}");
                let _ = done_tx.send(Err(e)).await;
            }
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LifecycleError::Cancelled),
            terminal = done_rx.recv() => match terminal {
                Some(Ok(())) => Ok(()),
                Some(Err(e)) => Err(LifecycleError::Middleware {
                    step: LifecycleStep::SyncBlockchain,
                    source: e,
                }),
                None => Err(LifecycleError::Middleware {
                    step: LifecycleStep::SyncBlockchain,
                    source: MiddlewareError::Internal(
                        "sync ended without reporting a result".to_string(),
                    ),
                }),
            },
        }
    }
}

/// Listener for an attempt driven from the terminal.
///
/// Progress updates are diagnostic only; the terminal result is forwarded to
/// the waiting caller.
struct TerminalSyncListener {
    done: mpsc::Sender<Result<(), MiddlewareError>>,
}

impl SyncProgressListener for TerminalSyncListener {
    fn sync_started(&self) {
        println!("Blockchain sync started");
    }

    fn headers_fetched(&self, percentage: i64) {
        debug!("fetching block headers: {}%", percentage);
    }

    fn address_discovered(&self, state: &str) {
        debug!("discovering used addresses: {}", state);
    }

    fn rescan_progress(&self, percentage: i64) {
        debug!("rescanning blocks: {}%", percentage);
    }

    fn sync_ended(&self, result: Result<(), MiddlewareError>) {
        match &result {
            Ok(()) => println!("Blockchain synced successfully"),
            Err(e) => eprintln!("Blockchain sync completed with error: {e}"),
        }
        // The channel is bounded at one entry and each attempt reports one
        // terminal event, so a failed send only means the caller is gone.
        let _ = self.done.try_send(result);
    }
}
