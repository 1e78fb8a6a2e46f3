//! Strictly Duel - Unified CLI
//!
//! Hosts a two-player tic-tac-toe session or joins one as a player.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::PathBuf;
use strictly_duel::{Coordinator, DuelConfig, HtmlStore, PeerClient, RandomStrategy};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_duel=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            host,
            port,
            state_path,
        } => {
            let config = resolve(config, host, port)?;
            let config = match state_path {
                Some(path) => config.with_state_path(path),
                None => config,
            };
            run_server(config).await
        }
        Command::Play {
            config,
            host,
            port,
            think_ms,
            decline_rematch,
        } => {
            let config = resolve(config, host, port)?;
            let config = match think_ms {
                Some(ms) => config.with_think_time_ms(ms),
                None => config,
            };
            run_player(config, !decline_rematch).await
        }
    }
}

/// Loads the config file and applies command-line overrides.
fn resolve(path: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<DuelConfig> {
    let mut config = DuelConfig::load(path.as_deref())?;
    if let Some(host) = host {
        config = config.with_host(host)?;
    }
    if let Some(port) = port {
        config = config.with_port(port)?;
    }
    Ok(config)
}

/// Host a session until it ends or Ctrl-C is pressed.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_server(config: DuelConfig) -> Result<()> {
    info!("Starting Strictly Duel server");

    let store = HtmlStore::new(config.state_path().clone());
    let coordinator = Coordinator::bind(config.session_config()?, store).await?;

    let handle = coordinator.handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => handle.shutdown(),
            Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
        }
    });

    coordinator.run().await?;
    info!("Session finished");
    Ok(())
}

/// Join a session with a random-move strategy.
#[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
async fn run_player(config: DuelConfig, accept_rematch: bool) -> Result<()> {
    let mut client = PeerClient::connect(config.socket_addr()?).await?;
    let mut strategy = RandomStrategy::new(config.think_time(), accept_rematch);

    match client.run(&mut strategy).await? {
        Some(last) => info!(mark = ?client.mark(), state = %last, "Session over"),
        None => info!("Session over before any game state arrived"),
    }
    Ok(())
}
