//! Interactive command run mode.
//!
//! Thin dispatch over the opened wallet; the commands here are deliberately
//! small since result formatting and wallet business logic live downstream.
//! Running with no command lists what is available and fails, the same way
//! an unrecognized command does.

use crate::lifecycle::{LifecycleError, WalletLifecycleManager};
use crate::session::CancelToken;

/// Commands available in interactive mode, sorted.
const COMMANDS: &[&str] = &["netinfo", "sync"];

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no command provided")]
    MissingCommand,

    #[error("unexpected command: {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Execute one interactive command against the opened wallet.
pub async fn run(
    manager: &WalletLifecycleManager,
    cancel: &CancelToken,
    command: Option<&str>,
) -> Result<(), CommandError> {
    match command {
        None => {
            eprintln!("Available Commands: {}", COMMANDS.join(", "));
            Err(CommandError::MissingCommand)
        }
        Some("netinfo") => {
            println!("Connected to the {} network", manager.middleware().net_type());
            Ok(())
        }
        Some("sync") => {
            manager.sync_blockchain(cancel).await?;
            Ok(())
        }
        Some(other) => {
            eprintln!("unexpected command: {other}");
            eprintln!("Available Commands: {}", COMMANDS.join(", "));
            Err(CommandError::UnknownCommand(other.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::testutil::{MockMiddleware, ScriptedPrompter, SyncScript};
    use std::sync::Arc;

    fn manager(middleware: Arc<MockMiddleware>) -> WalletLifecycleManager {
        WalletLifecycleManager::new(middleware, Arc::new(ScriptedPrompter::new(&[])))
    }

    #[tokio::test]
    async fn no_command_is_an_error() {
        let manager = manager(Arc::new(MockMiddleware::default()));
        let session = Session::new();
        let token = session.cancel_token();

        let err = run(&manager, &token, None).await.unwrap_err();
        assert!(matches!(err, CommandError::MissingCommand));
    }

    #[tokio::test]
    async fn unknown_command_is_an_error() {
        let manager = manager(Arc::new(MockMiddleware::default()));
        let session = Session::new();
        let token = session.cancel_token();

        let err = run(&manager, &token, Some("teleport")).await.unwrap_err();
        assert!(matches!(err, CommandError::UnknownCommand(name) if name == "teleport"));
    }

    #[tokio::test]
    async fn sync_command_drives_a_sync_attempt() {
        let middleware = Arc::new(MockMiddleware::default().with_sync(SyncScript::Succeed));
        let manager = manager(middleware.clone());
        let session = Session::new();
        let token = session.cancel_token();

        run(&manager, &token, Some("sync")).await.unwrap();
        assert!(middleware.was_called("sync_blockchain"));
    }
}
