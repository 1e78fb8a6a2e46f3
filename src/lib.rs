//! Strictly Duel library - two-player networked tic-tac-toe
//!
//! A single coordinator hosts one game between two TCP peers, persists every
//! snapshot, suspends the game while a peer is missing and offers a rematch
//! when the game ends.
//!
//! # Architecture
//!
//! - **Rules**: board, turn and status evaluation (`strictly_tictactoe`)
//! - **Protocol**: newline-delimited text messages between server and peers
//! - **Session**: the coordinator and its two player slots
//! - **Store**: snapshot persistence (HTML page or in memory)
//! - **Client**: a peer that plays through a pluggable strategy
//!
//! # Example
//!
//! ```no_run
//! use strictly_duel::{Coordinator, DuelConfig, MemoryStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = DuelConfig::default().session_config()?;
//! let coordinator = Coordinator::bind(config, MemoryStore::new()).await?;
//! coordinator.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod error;
mod protocol;
mod session;
mod store;

// Crate-level exports - Configuration
pub use config::{ConfigError, DuelConfig};

// Crate-level exports - Errors
pub use error::{SessionError, SessionErrorKind};

// Crate-level exports - Wire protocol
pub use protocol::{
    ACCEPT_VOTE, ACKNOWLEDGED, ASSIGN_PREFIX, DECLINE_VOTE, ERROR_PREFIX, PeerMessage,
    ProtocolError, REMATCH_PROMPT, STATE_PREFIX, ServerMessage,
};

// Crate-level exports - Session
pub use session::{BoundedPoll, Coordinator, SessionConfig, SessionHandle, SlotState};

// Crate-level exports - Persistence
pub use store::{HtmlStore, MemoryStore, SnapshotStore, StoreError};

// Crate-level exports - Peer client
pub use client::{FirstFreeStrategy, PeerClient, RandomStrategy, Strategy};

// Crate-level exports - Game types
pub use strictly_tictactoe::{Board, Cell, Game, Mark, Move, Snapshot, Status};
