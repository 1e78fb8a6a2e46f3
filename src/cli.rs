//! Command-line interface for strictly_duel.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strictly Duel - two-player tic-tac-toe over TCP
#[derive(Parser, Debug)]
#[command(name = "strictly_duel")]
#[command(about = "Two-player networked tic-tac-toe with reconnection and rematches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host a game session
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Where to keep the HTML snapshot page
        #[arg(long)]
        state_path: Option<PathBuf>,
    },

    /// Join a session as a random-move player
    Play {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Server host
        #[arg(long)]
        host: Option<String>,

        /// Server port
        #[arg(short, long)]
        port: Option<u16>,

        /// Milliseconds to think before each move
        #[arg(long)]
        think_ms: Option<u64>,

        /// Vote against every rematch
        #[arg(long)]
        decline_rematch: bool,
    },
}
