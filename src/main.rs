mod cli;
mod config;
mod lifecycle;
mod middleware;
mod prompt;
mod server;
mod session;
#[cfg(test)]
mod testutil;

use clap::Parser;
use config::AppConfig;
use middleware::{WalletMiddleware, WalletRpcMiddleware};
use prompt::{InteractivePrompter, TerminalPrompter};
use session::{listen_for_interrupts, Session, SessionOrchestrator, ShutdownCoordinator};
use std::sync::Arc;
use tracing::debug;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let config = AppConfig::parse();
    debug!("starting wallet session on {}", config.net_type());

    let session = Session::new();

    // The coordinator subscribes to the shutdown trigger before the
    // interrupt listener starts, so a signal can never be lost.
    let coordinator = ShutdownCoordinator::new(session.clone());
    let shutdown_done = tokio::spawn(coordinator.run());
    listen_for_interrupts(session.clone());

    let middleware: Arc<dyn WalletMiddleware> = Arc::new(WalletRpcMiddleware::new(
        config.rpc_address.clone(),
        config.net_type().to_string(),
    ));
    let prompter: Arc<dyn InteractivePrompter> = Arc::new(TerminalPrompter);

    SessionOrchestrator::new(session.clone(), config, middleware, prompter)
        .run()
        .await;

    // The exit status is decided only after every shutdown hook has run. On
    // the interrupt path the mode can record its error after the
    // coordinator's read, so the session is consulted again here.
    let had_error = shutdown_done.await.unwrap_or(true) || session.operational_error().is_some();
    std::process::exit(if had_error { 1 } else { 0 });
}
