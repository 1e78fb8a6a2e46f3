//! Move and vote policies for peer clients.

use rand::seq::SliceRandom;
use std::time::Duration;
use strictly_tictactoe::{Mark, Move, Snapshot};
use tracing::{debug, instrument};

/// Decides what a peer plays and whether it wants a rematch.
#[async_trait::async_trait]
pub trait Strategy: Send {
    /// Picks a move for `mark` on an ongoing snapshot, or `None` to pass.
    async fn choose_move(&mut self, snapshot: &Snapshot, mark: Mark) -> Option<Move>;

    /// Answers a rematch prompt. `last` is the final snapshot of the game.
    async fn accept_rematch(&mut self, last: Option<&Snapshot>) -> bool;
}

/// Plays a random free cell after thinking for a while.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    think_time: Duration,
    rematch: bool,
}

impl RandomStrategy {
    /// Creates a strategy that waits `think_time` before each move.
    pub fn new(think_time: Duration, rematch: bool) -> Self {
        Self { think_time, rematch }
    }
}

#[async_trait::async_trait]
impl Strategy for RandomStrategy {
    #[instrument(skip(self, snapshot))]
    async fn choose_move(&mut self, snapshot: &Snapshot, _mark: Mark) -> Option<Move> {
        tokio::time::sleep(self.think_time).await;
        let free = snapshot.board().free_cells();
        let (row, col) = *free.choose(&mut rand::thread_rng())?;
        debug!(row, col, "Picked random cell");
        Move::new(row, col).ok()
    }

    async fn accept_rematch(&mut self, _last: Option<&Snapshot>) -> bool {
        self.rematch
    }
}

/// Always plays the first free cell in row-major order. Accepts a fixed
/// number of rematches, then declines.
#[derive(Debug, Clone, Default)]
pub struct FirstFreeStrategy {
    rematches: u32,
}

impl FirstFreeStrategy {
    /// Creates a strategy that accepts `rematches` rematch prompts.
    pub fn new(rematches: u32) -> Self {
        Self { rematches }
    }
}

#[async_trait::async_trait]
impl Strategy for FirstFreeStrategy {
    async fn choose_move(&mut self, snapshot: &Snapshot, _mark: Mark) -> Option<Move> {
        let (row, col) = snapshot.board().free_cells().into_iter().next()?;
        Move::new(row, col).ok()
    }

    async fn accept_rematch(&mut self, _last: Option<&Snapshot>) -> bool {
        if self.rematches == 0 {
            return false;
        }
        self.rematches -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strictly_tictactoe::Game;

    #[tokio::test]
    async fn test_first_free_plays_row_major() {
        let mut game = Game::new();
        game.place_mark(0, 0).unwrap();
        game.advance_turn();
        let snapshot = Snapshot::capture(&game, false);

        let mut strategy = FirstFreeStrategy::default();
        let mv = strategy.choose_move(&snapshot, Mark::O).await.unwrap();
        assert_eq!((mv.row(), mv.col()), (0, 1));
    }

    #[tokio::test]
    async fn test_first_free_counts_down_rematches() {
        let mut strategy = FirstFreeStrategy::new(1);
        assert!(strategy.accept_rematch(None).await);
        assert!(!strategy.accept_rematch(None).await);
    }

    #[tokio::test]
    async fn test_random_picks_a_free_cell() {
        let mut game = Game::new();
        for (r, c) in [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0)] {
            game.place_mark(r, c).unwrap();
            game.advance_turn();
        }
        let snapshot = Snapshot::capture(&game, false);

        let mut strategy = RandomStrategy::new(Duration::ZERO, false);
        let mv = strategy.choose_move(&snapshot, Mark::X).await.unwrap();
        assert_eq!((mv.row(), mv.col()), (2, 2));
        assert!(!strategy.accept_rematch(Some(&snapshot)).await);
    }
}
