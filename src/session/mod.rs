//! Process session state and shutdown coordination
//!
//! This module owns everything that used to be process-global mutable state:
//! the cancel token propagated to long-running operations, the ordered list of
//! shutdown hooks, the recorded operational error, and the one-shot shutdown
//! trigger. A single `Session` is created at startup and shared behind an
//! `Arc` with every concurrent task; all mutable fields are mutex-confined
//! because the interrupt listener and the run mode's normal completion can
//! race to touch them.
//!
//! - `shutdown`: the shutdown state machine and the OS interrupt listener
//! - `orchestrator`: the top-level session driver and run-mode dispatch

/// Top-level session driver and run-mode dispatch
mod orchestrator;
/// Shutdown state machine and OS interrupt handling
mod shutdown;

pub use orchestrator::SessionOrchestrator;
pub use shutdown::{listen_for_interrupts, ShutdownCoordinator};

use futures::future::{BoxFuture, FutureExt};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// A cleanup action executed during shutdown.
///
/// Hooks run exactly once, sequentially, in registration order. They carry no
/// return value; cleanup is best effort and a hook cannot abort the ones
/// registered after it.
pub type ShutdownHook = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Process-scoped session state.
///
/// Created once at startup and torn down by the `ShutdownCoordinator`.
pub struct Session {
    /// Cancellation signal observed by every long-running operation.
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
    /// Cleanup actions, append-only until shutdown begins.
    hooks: Mutex<Option<Vec<ShutdownHook>>>,
    /// First operational error recorded during the run.
    operational_error: Mutex<Option<String>>,
    /// One-shot shutdown trigger; later sends are acknowledged but ignored.
    shutdown_tx: broadcast::Sender<()>,
    shutdown_triggered: Mutex<bool>,
}

impl Session {
    pub fn new() -> Arc<Self> {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (shutdown_tx, _) = broadcast::channel(1);

        Arc::new(Self {
            cancel_tx,
            cancel_rx,
            hooks: Mutex::new(Some(Vec::new())),
            operational_error: Mutex::new(None),
            shutdown_tx,
            shutdown_triggered: Mutex::new(false),
        })
    }

    /// Token observed by operations that must stop waiting when the session
    /// is torn down.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            rx: self.cancel_rx.clone(),
        }
    }

    /// The cancel function packaged as a shutdown hook. Registered first so
    /// that in-flight operations stop waiting before any other cleanup runs.
    pub fn cancel_hook(&self) -> ShutdownHook {
        let cancel_tx = self.cancel_tx.clone();
        Box::new(move || {
            let _ = cancel_tx.send(true);
            futures::future::ready(()).boxed()
        })
    }

    /// Append a cleanup action to run at shutdown.
    ///
    /// Hooks may only be registered before the shutdown trigger fires; a hook
    /// registered after shutdown has begun is dropped with a warning, and the
    /// resource it would have released is reclaimed by process exit.
    pub fn register_shutdown_hook(&self, hook: ShutdownHook) {
        let mut hooks = self.hooks.lock().expect("hook list lock poisoned");
        match hooks.as_mut() {
            Some(hooks) => hooks.push(hook),
            None => warn!("shutdown already in progress, dropping late shutdown hook"),
        }
    }

    /// Record an operational error. The first recorded error wins; later
    /// errors are logged and discarded.
    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        let mut slot = self
            .operational_error
            .lock()
            .expect("operational error lock poisoned");
        match slot.as_ref() {
            None => *slot = Some(message),
            Some(first) => debug!(
                "operational error already recorded ({}), discarding: {}",
                first, message
            ),
        }
    }

    /// The recorded operational error, if any.
    pub fn operational_error(&self) -> Option<String> {
        self.operational_error
            .lock()
            .expect("operational error lock poisoned")
            .clone()
    }

    /// Signal that shutdown should begin.
    ///
    /// Returns true if this call triggered the transition; a session already
    /// shutting down acknowledges the repeat trigger and ignores it.
    pub fn begin_shutdown(&self) -> bool {
        let mut triggered = self
            .shutdown_triggered
            .lock()
            .expect("shutdown trigger lock poisoned");
        if *triggered {
            debug!("shutdown already signaled, ignoring repeat trigger");
            return false;
        }
        *triggered = true;
        // The coordinator subscribes before any trigger can fire; a send
        // error here means the process is already past hook execution.
        let _ = self.shutdown_tx.send(());
        true
    }

    /// Whether the shutdown trigger has fired.
    pub fn shutdown_begun(&self) -> bool {
        *self
            .shutdown_triggered
            .lock()
            .expect("shutdown trigger lock poisoned")
    }

    fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Take the hook list for execution, closing it to further registration.
    fn take_hooks(&self) -> Vec<ShutdownHook> {
        self.hooks
            .lock()
            .expect("hook list lock poisoned")
            .take()
            .unwrap_or_default()
    }
}

/// Cloneable view of the session's cancellation signal.
#[derive(Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Whether cancellation has already been signaled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until cancellation is signaled. Completes immediately if the
    /// session was already cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // A closed channel means the session is gone, which counts as
        // cancelled for anyone still waiting.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
