//! Top-level session driver.
//!
//! The orchestrator owns the control flow of one process run: register the
//! cancel function as the first shutdown hook, obtain an open wallet through
//! the lifecycle manager (registering its close operation as the second
//! hook), dispatch to exactly one run mode, record any operational error, and
//! signal shutdown. An OS interrupt and the mode's normal completion race to
//! trigger shutdown; the loser's attempt to signal again is a no-op.

use super::Session;
use crate::cli;
use crate::config::{AppConfig, RunMode};
use crate::lifecycle::WalletLifecycleManager;
use crate::middleware::WalletMiddleware;
use crate::prompt::InteractivePrompter;
use crate::server;
use std::sync::Arc;
use tracing::debug;

pub struct SessionOrchestrator {
    session: Arc<Session>,
    config: AppConfig,
    middleware: Arc<dyn WalletMiddleware>,
    prompter: Arc<dyn InteractivePrompter>,
}

impl SessionOrchestrator {
    pub fn new(
        session: Arc<Session>,
        config: AppConfig,
        middleware: Arc<dyn WalletMiddleware>,
        prompter: Arc<dyn InteractivePrompter>,
    ) -> Self {
        Self {
            session,
            config,
            middleware,
            prompter,
        }
    }

    /// Drive the session to completion and signal shutdown.
    pub async fn run(self) {
        // Cancelling in-flight operations is the first thing shutdown does.
        self.session.register_shutdown_hook(self.session.cancel_hook());
        let cancel = self.session.cancel_token();

        let manager = WalletLifecycleManager::new(
            Arc::clone(&self.middleware),
            Arc::clone(&self.prompter),
        );

        let handle = match manager.open_wallet(&cancel).await {
            Ok(handle) => handle,
            Err(e) => {
                // The failing step has already explained itself to the user.
                self.session.record_error(e.to_string());
                self.session.begin_shutdown();
                return;
            }
        };
        self.session.register_shutdown_hook(handle.close_hook());

        if self.config.sync_blockchain {
            if let Err(e) = manager.sync_blockchain(&cancel).await {
                self.session.record_error(e.to_string());
                self.session.begin_shutdown();
                return;
            }
        }

        let mode = self.config.run_mode();
        debug!("dispatching to {:?} mode", mode);
        let mode_result: Result<(), String> = match mode {
            RunMode::Server => server::run(
                cancel.clone(),
                Arc::clone(&self.middleware),
                &self.config.listen_address,
            )
            .await
            .map_err(|e| {
                eprintln!("Status server failed: {e}");
                format!("status server failed: {e}")
            }),
            RunMode::Desktop => {
                eprintln!("Desktop mode is not supported in this build");
                Err("desktop mode is not supported in this build".to_string())
            }
            RunMode::Interactive => cli::run(&manager, &cancel, self.config.command.as_deref())
                .await
                .map_err(|e| e.to_string()),
        };

        if let Err(message) = mode_result {
            self.session.record_error(message);
        }

        // Normal completion and the interrupt path race to this point; the
        // loser's signal is acknowledged and dropped.
        self.session.begin_shutdown();
    }
}
