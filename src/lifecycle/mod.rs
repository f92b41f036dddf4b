//! Wallet Lifecycle Module
//!
//! This module sequences the wallet's session lifecycle: deciding whether a
//! wallet exists, driving interactive creation (passphrase entry, seed
//! generation, mandatory backup acknowledgment), opening an existing wallet,
//! and running blockchain sync. It is composed of:
//!
//! - `WalletLifecycleManager`: the sequencing logic over the middleware and
//!   prompter seams
//! - `sync`: the sync attempt driver and its terminal progress listener
//!
//! Middleware calls can block arbitrarily long (another instance may hold the
//! wallet lock), so each one runs on a spawned task raced against the
//! session's cancel token. Cancellation is cooperative and one-directional:
//! losing the race stops this code from waiting, but the spawned call is
//! abandoned rather than aborted and may still complete in the background.
//! That leak is bounded by the number of lifecycle steps and reclaimed at
//! process exit.

/// Blockchain sync driver and terminal progress listener
mod sync;

use crate::middleware::{MiddlewareError, WalletMiddleware};
use crate::prompt::{normalize_response, validators, InteractivePrompter};
use crate::session::{CancelToken, ShutdownHook};
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinError;
use zeroize::Zeroizing;

/// Lifecycle operation that a middleware failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleStep {
    CheckWallet,
    OpenWallet,
    GenerateSeed,
    CreateWallet,
    SyncBlockchain,
}

impl fmt::Display for LifecycleStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleStep::CheckWallet => "wallet existence check",
            LifecycleStep::OpenWallet => "wallet open",
            LifecycleStep::GenerateSeed => "seed generation",
            LifecycleStep::CreateWallet => "wallet creation",
            LifecycleStep::SyncBlockchain => "blockchain sync",
        };
        f.write_str(name)
    }
}

/// Errors produced while sequencing the wallet lifecycle.
///
/// `Cancelled` is deliberately distinct from `Middleware` so a single failure
/// is never reported both as a cancellation and as an engine error, and
/// `UserDeclined` marks a normal negative outcome rather than a system fault.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("wallet already exists")]
    AlreadyExists,

    #[error("passphrases do not match")]
    PassphraseMismatch,

    #[error("wallet doesn't exist")]
    UserDeclined,

    #[error("operation cancelled")]
    Cancelled,

    #[error("{step} failed: {source}")]
    Middleware {
        step: LifecycleStep,
        source: MiddlewareError,
    },

    #[error("failed to read input: {0}")]
    Prompt(#[from] std::io::Error),
}

impl LifecycleError {
    fn at(step: LifecycleStep) -> impl FnOnce(MiddlewareError) -> Self {
        move |source| LifecycleError::Middleware { step, source }
    }

    fn from_join(step: LifecycleStep, error: JoinError) -> Self {
        LifecycleError::Middleware {
            step,
            source: MiddlewareError::Internal(format!("lifecycle task failed: {error}")),
        }
    }
}

/// Opaque guard for an opened wallet.
///
/// Produced by the lifecycle manager once the wallet is open; the session
/// registers its close operation as a shutdown hook so the wallet is released
/// exactly once during teardown.
pub struct WalletHandle {
    middleware: Arc<dyn WalletMiddleware>,
}

impl std::fmt::Debug for WalletHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletHandle").finish_non_exhaustive()
    }
}

impl WalletHandle {
    fn new(middleware: Arc<dyn WalletMiddleware>) -> Self {
        Self { middleware }
    }

    /// The wallet close operation, packaged for shutdown registration.
    pub fn close_hook(&self) -> ShutdownHook {
        let middleware = Arc::clone(&self.middleware);
        Box::new(move || async move { middleware.close_wallet().await }.boxed())
    }
}

/// Sequences existence-check, create-or-open, and blockchain sync using the
/// middleware and prompter seams.
pub struct WalletLifecycleManager {
    middleware: Arc<dyn WalletMiddleware>,
    prompter: Arc<dyn InteractivePrompter>,
}

/// Outcome of the spawned exists-then-open task.
enum LoadOutcome {
    NoWallet,
    Opened,
    Failed(LifecycleStep, MiddlewareError),
}

impl WalletLifecycleManager {
    pub fn new(
        middleware: Arc<dyn WalletMiddleware>,
        prompter: Arc<dyn InteractivePrompter>,
    ) -> Self {
        Self {
            middleware,
            prompter,
        }
    }

    pub fn middleware(&self) -> &Arc<dyn WalletMiddleware> {
        &self.middleware
    }

    /// Check whether a wallet exists, racing the middleware call against
    /// cancellation.
    ///
    /// If cancellation wins, the spawned check is abandoned and may still
    /// complete in the background.
    pub async fn determine_existence(&self, cancel: &CancelToken) -> Result<bool, LifecycleError> {
        let middleware = Arc::clone(&self.middleware);
        let mut check = tokio::spawn(async move { middleware.wallet_exists().await });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LifecycleError::Cancelled),
            joined = &mut check => match joined {
                Ok(result) => result.map_err(LifecycleError::at(LifecycleStep::CheckWallet)),
                Err(e) => Err(LifecycleError::from_join(LifecycleStep::CheckWallet, e)),
            },
        }
    }

    /// Open the wallet, offering interactive creation when none exists.
    ///
    /// The existence check and open run as one spawned task raced against
    /// cancellation, so a context cancelled before the check settles always
    /// yields the cancellation error rather than a middleware one.
    pub async fn open_wallet(&self, cancel: &CancelToken) -> Result<WalletHandle, LifecycleError> {
        // Loading may stall on another instance's wallet lock; tell the user
        // what is going on before we start waiting.
        println!("Looking for wallets...");

        let middleware = Arc::clone(&self.middleware);
        let mut load = tokio::spawn(async move {
            match middleware.wallet_exists().await {
                Err(e) => LoadOutcome::Failed(LifecycleStep::CheckWallet, e),
                Ok(false) => LoadOutcome::NoWallet,
                Ok(true) => match middleware.open_wallet().await {
                    Ok(()) => LoadOutcome::Opened,
                    Err(e) => LoadOutcome::Failed(LifecycleStep::OpenWallet, e),
                },
            }
        });

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LifecycleError::Cancelled),
            joined = &mut load => {
                joined.map_err(|e| LifecycleError::from_join(LifecycleStep::OpenWallet, e))?
            }
        };

        match outcome {
            LoadOutcome::NoWallet => self.offer_wallet_creation(cancel).await,
            LoadOutcome::Opened => Ok(WalletHandle::new(Arc::clone(&self.middleware))),
            LoadOutcome::Failed(step, source) => {
                match step {
                    LifecycleStep::CheckWallet => {
                        eprintln!(
                            "Error checking {} wallet: {}",
                            self.middleware.net_type(),
                            source
                        );
                    }
                    _ => {
                        eprintln!(
                            "Failed to open {} wallet: {}",
                            self.middleware.net_type(),
                            source
                        );
                    }
                }
                Err(LifecycleError::Middleware { step, source })
            }
        }
    }

    /// Ask the user whether to create a wallet now; decline is a normal
    /// negative outcome.
    async fn offer_wallet_creation(
        &self,
        cancel: &CancelToken,
    ) -> Result<WalletHandle, LifecycleError> {
        let answer = match self
            .prompter
            .request_input(
                "No wallet found. Would you like to create one now? [y/N]",
                validators::yes_or_no,
            )
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                eprintln!("Error reading your response: {e}");
                return Err(e.into());
            }
        };

        let answer = normalize_response(&answer);
        if answer.is_empty() || answer.eq_ignore_ascii_case("n") {
            println!("Maybe later. Bye.");
            return Err(LifecycleError::UserDeclined);
        }

        self.create_wallet(cancel).await
    }

    /// Create a new wallet interactively, then run the initial blockchain
    /// sync.
    ///
    /// Aborts on the first failed step. Passphrase and seed live only in
    /// transient zeroized state for the duration of this call.
    pub async fn create_wallet(&self, cancel: &CancelToken) -> Result<WalletHandle, LifecycleError> {
        let exists = match self.determine_existence(cancel).await {
            Ok(exists) => exists,
            Err(e) => {
                if let LifecycleError::Middleware { source, .. } = &e {
                    eprintln!(
                        "Error checking {} wallet: {}",
                        self.middleware.net_type(),
                        source
                    );
                }
                return Err(e);
            }
        };
        if exists {
            eprintln!(
                "{} wallet already exists",
                title_case(self.middleware.net_type())
            );
            return Err(LifecycleError::AlreadyExists);
        }

        let passphrase = Zeroizing::new(
            self.read_secret("Enter private passphrase for new wallet")
                .await?,
        );
        let confirmation = Zeroizing::new(self.read_secret("Confirm passphrase").await?);
        if *passphrase != *confirmation {
            eprintln!("Passphrases do not match");
            return Err(LifecycleError::PassphraseMismatch);
        }

        let seed = Zeroizing::new(self.middleware.generate_seed().await.map_err(|e| {
            eprintln!("Error generating seed for new wallet: {e}");
            LifecycleError::at(LifecycleStep::GenerateSeed)(e)
        })?);
        display_wallet_seed(&seed);

        // The prompt repeats until the user acknowledges the backup, so the
        // returned value itself is of no interest.
        if let Err(e) = self
            .prompter
            .request_input(
                r#"Enter "OK" to continue. This assumes you have stored the seed in a safe and secure location"#,
                validators::backup_acknowledgment,
            )
            .await
        {
            eprintln!("Error reading input: {e}");
            return Err(e.into());
        }

        self.middleware
            .create_wallet(passphrase.as_str(), seed.as_str())
            .await
            .map_err(|e| {
                eprintln!("Error creating wallet: {e}");
                LifecycleError::at(LifecycleStep::CreateWallet)(e)
            })?;
        println!("Your wallet has been created successfully");

        // First blockchain sync is the final step of creation.
        self.sync_blockchain(cancel).await?;

        Ok(WalletHandle::new(Arc::clone(&self.middleware)))
    }

    async fn read_secret(&self, prompt: &str) -> Result<String, LifecycleError> {
        self.prompter
            .request_input_secure(prompt, validators::non_empty)
            .await
            .map_err(|e| {
                eprintln!("Error reading input: {e}");
                e.into()
            })
    }
}

/// Show the generated seed together with the backup warning.
fn display_wallet_seed(seed: &str) {
    println!();
    println!("Your wallet generation seed is:");
    println!("{seed}");
    println!(
        "IMPORTANT: keep the seed in a safe place, you will NOT be able to restore your wallet without it."
    );
    println!(
        "Anyone who has access to the seed can restore your wallet and spend your funds, so store it securely."
    );
    println!();
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
