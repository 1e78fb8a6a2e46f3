//! Immutable game snapshots exchanged with peers and persisted.

use crate::rules::Game;
use crate::types::{Board, Mark};
use tracing::instrument;

/// Session status as seen by peers.
///
/// Always derived from board, turn and the suspended flag; never stored on
/// its own.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// Paused until both peers are connected.
    Waiting,
    /// A game is being played.
    Ongoing,
    /// The mark that just moved completed a line.
    Win,
    /// The mark to move already holds a line (restored state only).
    Lose,
    /// Board full without a line.
    Draw,
}

impl Status {
    /// Derives the status of `game`.
    ///
    /// The mover is `game.turn().opponent()` because the turn has already
    /// been advanced; its line is reported through [`Game::check_for_lose`]
    /// and surfaces as [`Status::Win`].
    #[instrument(skip(game), fields(turn = %game.turn()))]
    pub fn derive(game: &Game, suspended: bool) -> Self {
        if suspended {
            Status::Waiting
        } else if game.check_for_lose() {
            Status::Win
        } else if game.check_for_win() {
            Status::Lose
        } else if game.is_full() {
            Status::Draw
        } else {
            Status::Ongoing
        }
    }

    /// True for the three end-of-game statuses.
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Win | Status::Lose | Status::Draw)
    }
}

/// Immutable `{board, turn, status}` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Snapshot {
    board: Board,
    turn: Mark,
    status: Status,
}

impl Snapshot {
    /// Assembles a snapshot from its parts.
    pub fn new(board: Board, turn: Mark, status: Status) -> Self {
        Self {
            board,
            turn,
            status,
        }
    }

    /// Captures the current state of `game`.
    pub fn capture(game: &Game, suspended: bool) -> Self {
        Self {
            board: game.board().clone(),
            turn: game.turn(),
            status: Status::derive(game, suspended),
        }
    }

    /// Fresh suspended snapshot: empty board, X to move, waiting for peers.
    pub fn waiting() -> Self {
        Self::capture(&Game::new(), true)
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The mark whose move is next.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// The derived status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// True once the game has ended.
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }
}
