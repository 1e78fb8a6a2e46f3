//! Game engine: board mutation and line/draw detection.
//!
//! # Win/lose orientation
//!
//! [`Game::check_for_win`] tests the *current* turn and [`Game::check_for_lose`]
//! tests the *other* mark. Callers place a mark and then call
//! [`Game::advance_turn`] before evaluating, so at evaluation time the mark that
//! just moved is the "lose" side. A completed line by the mover therefore shows
//! up through `check_for_lose`, and [`Status::derive`](crate::Status::derive)
//! reports it as [`Status::Win`](crate::Status::Win). Peers rely on this
//! orientation on the wire; keep it.

use crate::snapshot::Snapshot;
use crate::types::{Board, Cell, Mark};
use tracing::{debug, instrument};

/// Errors returned by [`Game::place_mark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PlaceError {
    /// The target cell already holds a mark.
    #[display("cell ({row}, {col}) is already occupied")]
    Occupied {
        /// Row of the rejected move.
        row: usize,
        /// Column of the rejected move.
        col: usize,
    },
    /// The coordinates are outside 0..=2.
    #[display("cell ({row}, {col}) is outside the board")]
    OutOfBounds {
        /// Row of the rejected move.
        row: usize,
        /// Column of the rejected move.
        col: usize,
    },
}

/// Tic-tac-toe rules engine. Performs no I/O.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Game {
    board: Board,
    turn: Mark,
}

impl Game {
    /// Creates a new game: empty board, X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            turn: Mark::X,
        }
    }

    /// Restores board and turn from a snapshot.
    #[instrument(skip(snapshot))]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            board: snapshot.board().clone(),
            turn: snapshot.turn(),
        }
    }

    /// Clears the board and gives the move back to X.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the mark whose move is next.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Marks `(row, col)` with the current turn's symbol.
    ///
    /// Leaves the board untouched and returns an error if the cell is occupied
    /// or out of bounds. Does not advance the turn.
    #[instrument(skip(self), fields(turn = %self.turn))]
    pub fn place_mark(&mut self, row: usize, col: usize) -> Result<(), PlaceError> {
        match self.board.get(row, col) {
            None => Err(PlaceError::OutOfBounds { row, col }),
            Some(Cell::Occupied(_)) => Err(PlaceError::Occupied { row, col }),
            Some(Cell::Empty) => {
                self.board.set(row, col, Cell::Occupied(self.turn));
                debug!(row, col, mark = %self.turn, "Mark placed");
                Ok(())
            }
        }
    }

    /// Flips the turn. Does not check that a move happened.
    pub fn advance_turn(&mut self) {
        self.turn = self.turn.opponent();
    }

    /// True iff `mark` has completed a line.
    pub fn has_line(&self, mark: Mark) -> bool {
        self.board.has_line(mark)
    }

    /// True iff no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.board.is_full()
    }

    /// Line completed by the current turn.
    pub fn check_for_win(&self) -> bool {
        self.has_line(self.turn)
    }

    /// Line completed by the mark that is not the current turn.
    pub fn check_for_lose(&self) -> bool {
        self.has_line(self.turn.opponent())
    }

    /// True once either mark has a line or the board is full.
    pub fn is_over(&self) -> bool {
        self.check_for_win() || self.check_for_lose() || self.is_full()
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut Game, moves: &[(usize, usize)]) {
        for &(r, c) in moves {
            game.place_mark(r, c).unwrap();
            game.advance_turn();
        }
    }

    #[test]
    fn test_new_game_starts_with_x() {
        let game = Game::new();
        assert_eq!(game.turn(), Mark::X);
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn test_place_mark_uses_current_turn() {
        let mut game = Game::new();
        game.place_mark(1, 1).unwrap();
        assert_eq!(game.board().get(1, 1), Some(Cell::Occupied(Mark::X)));
        // Placement alone does not flip the turn
        assert_eq!(game.turn(), Mark::X);
    }

    #[test]
    fn test_occupied_cell_is_rejected_without_mutation() {
        let mut game = Game::new();
        play(&mut game, &[(0, 0)]);
        let before = game.clone();

        let result = game.place_mark(0, 0);
        assert_eq!(result, Err(PlaceError::Occupied { row: 0, col: 0 }));
        assert_eq!(game, before);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut game = Game::new();
        assert_eq!(
            game.place_mark(3, 0),
            Err(PlaceError::OutOfBounds { row: 3, col: 0 })
        );
        assert_eq!(game, Game::new());
    }

    #[test]
    fn test_advance_turn_alternates() {
        let mut game = Game::new();
        game.advance_turn();
        assert_eq!(game.turn(), Mark::O);
        game.advance_turn();
        assert_eq!(game.turn(), Mark::X);
    }

    #[test]
    fn test_mover_line_shows_as_lose_check_after_switch() {
        let mut game = Game::new();
        play(&mut game, &[(0, 0), (1, 1), (0, 1), (2, 2), (0, 2)]);

        assert_eq!(game.turn(), Mark::O);
        assert!(game.check_for_lose());
        assert!(!game.check_for_win());
        assert!(game.is_over());
    }

    #[test]
    fn test_reset_clears_board_and_turn() {
        let mut game = Game::new();
        play(&mut game, &[(0, 0), (1, 1), (2, 2)]);
        game.reset();
        assert_eq!(game, Game::new());
    }
}
