//! Command-line configuration and run-mode selection.

use clap::Parser;

/// Wallet session manager and command-line client
#[derive(Parser, Debug, Clone)]
#[command(name = "walletctl", version, about)]
pub struct AppConfig {
    /// Run as a network status server instead of executing a command
    #[arg(long, conflicts_with = "desktop")]
    pub serve: bool,

    /// Run the desktop interface
    #[arg(long, conflicts_with = "serve")]
    pub desktop: bool,

    /// Listen address for the status server in --serve mode
    #[arg(long, default_value = "127.0.0.1:7070")]
    pub listen_address: String,

    /// Wallet daemon JSON-RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9110")]
    pub rpc_address: String,

    /// Connect to the test network instead of the main network
    #[arg(long)]
    pub testnet: bool,

    /// Sync the blockchain before dispatching to the selected mode
    #[arg(long)]
    pub sync_blockchain: bool,

    /// Command to execute in interactive mode
    #[arg(conflicts_with = "serve")]
    pub command: Option<String>,
}

/// The mutually exclusive run modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Server,
    Desktop,
    Interactive,
}

impl AppConfig {
    /// Select the run mode. Pure function of the configuration, evaluated
    /// once per run.
    pub fn run_mode(&self) -> RunMode {
        if self.serve {
            RunMode::Server
        } else if self.desktop {
            RunMode::Desktop
        } else {
            RunMode::Interactive
        }
    }

    pub fn net_type(&self) -> &'static str {
        if self.testnet { "testnet" } else { "mainnet" }
    }
}
