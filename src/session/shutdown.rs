//! Shutdown state machine and OS interrupt handling.
//!
//! The coordinator owns the teardown sequence: it waits for the one-shot
//! shutdown trigger, runs the registered hooks strictly in registration
//! order, and reports whether an operational error was recorded so the
//! process can pick its exit status. The interrupt listener converts OS
//! signals into shutdown triggers and keeps acknowledging signals that
//! arrive while teardown is already running.

use super::Session;
use std::sync::Arc;
use tracing::{debug, info};

/// States of the shutdown sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoordinatorState {
    /// Waiting for the shutdown trigger.
    Idle,
    /// Trigger consumed, hooks executing.
    ShuttingDown,
    /// All hooks have completed.
    Done,
}

/// Runs the shutdown sequence exactly once per process run.
pub struct ShutdownCoordinator {
    session: Arc<Session>,
    trigger: tokio::sync::broadcast::Receiver<()>,
    state: CoordinatorState,
}

impl ShutdownCoordinator {
    /// Create a coordinator for `session`.
    ///
    /// Must be constructed before anything can trigger shutdown, so the
    /// trigger subscription is in place when the first signal arrives.
    pub fn new(session: Arc<Session>) -> Self {
        let trigger = session.subscribe_shutdown();
        Self {
            session,
            trigger,
            state: CoordinatorState::Idle,
        }
    }

    /// Wait for the shutdown trigger, run all hooks in registration order,
    /// and report whether an operational error was recorded during the run.
    ///
    /// Hooks are awaited sequentially; a slow hook delays the ones after it
    /// but never reorders them, and the outcome is not reported until every
    /// hook has completed.
    pub async fn run(mut self) -> bool {
        debug_assert_eq!(self.state, CoordinatorState::Idle);
        // Ignores the error case: the sender lives in the session, which
        // outlives this task.
        let _ = self.trigger.recv().await;

        self.state = CoordinatorState::ShuttingDown;
        info!("shutting down");

        let hooks = self.session.take_hooks();
        for (position, hook) in hooks.into_iter().enumerate() {
            debug!("running shutdown hook {}", position);
            hook().await;
        }

        self.state = CoordinatorState::Done;
        self.session.operational_error().is_some()
    }
}

/// Spawn the OS interrupt listener.
///
/// The first interrupt or termination signal triggers shutdown; the listener
/// then keeps consuming signals and tells the operator that shutdown is
/// already in progress.
pub fn listen_for_interrupts(session: Arc<Session>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = signal(SignalKind::terminate()).expect("SIGTERM handler");
            let mut sigint = signal(SignalKind::interrupt()).expect("SIGINT handler");

            loop {
                let name = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                };
                if session.begin_shutdown() {
                    eprintln!(" Received {name} signal. Shutting down...");
                } else {
                    eprintln!(" Already shutting down... Please wait");
                }
            }
        }

        #[cfg(not(unix))]
        {
            loop {
                tokio::signal::ctrl_c().await.expect("Ctrl+C handler");
                if session.begin_shutdown() {
                    eprintln!(" Received interrupt signal. Shutting down...");
                } else {
                    eprintln!(" Already shutting down... Please wait");
                }
            }
        }
    });
}
