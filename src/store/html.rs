//! Human-viewable HTML page holding the current snapshot.

use super::{SnapshotStore, StoreError};
use std::path::{Path, PathBuf};
use strictly_tictactoe::{Board, Cell, Mark, Snapshot, Status};
use tracing::{debug, info, instrument};

const CELL_OPEN: &str = "<td class='cell'>";
const CELL_CLOSE: &str = "</td>";
const TURN_OPEN: &str = "<p class='turn'>Player ";

/// Writes the snapshot as an HTML page and reads board and turn back.
///
/// A restored snapshot is always [`Status::Waiting`]: the game stays
/// suspended until both peers are connected again.
#[derive(Debug, Clone)]
pub struct HtmlStore {
    path: PathBuf,
}

impl HtmlStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the page.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the page for `snapshot`.
    pub fn render(snapshot: &Snapshot) -> String {
        let mut html = String::from("<html><head><title>Tic Tac Toe</title></head><body>\n");
        html.push_str("<h1>Current Game State</h1>\n");
        html.push_str("<table border='1' style='font-size:30px; text-align:center;'>\n");
        for row in snapshot.board().rows() {
            html.push_str("<tr>");
            for cell in row {
                let mark = match cell {
                    Cell::Empty => String::new(),
                    Cell::Occupied(mark) => mark.to_string(),
                };
                html.push_str(&format!("{CELL_OPEN}{mark}{CELL_CLOSE}"));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</table>\n");
        html.push_str(&format!("{TURN_OPEN}{}'s Turn</p>\n", snapshot.turn()));
        html.push_str(&format!(
            "<p class='result'><strong>{}</strong></p>\n",
            headline(snapshot)
        ));
        html.push_str(&format!(
            "<p class='saved'>Saved {}</p>\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        html.push_str("</body></html>\n");
        html
    }

    /// Recovers board and turn from a rendered page.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the page lacks nine cells or a turn line.
    pub fn parse(html: &str) -> Result<Snapshot, StoreError> {
        let cells = html
            .split(CELL_OPEN)
            .skip(1)
            .map(|rest| {
                let content = rest
                    .split(CELL_CLOSE)
                    .next()
                    .unwrap_or_default()
                    .trim();
                match content {
                    "" => Ok(Cell::Empty),
                    other => other
                        .parse::<Mark>()
                        .map(Cell::Occupied)
                        .map_err(|_| StoreError::new(format!("invalid cell {other:?}"))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        if cells.len() != Board::SIZE * Board::SIZE {
            return Err(StoreError::new(format!("expected 9 cells, found {}", cells.len())));
        }

        let mut rows = [[Cell::Empty; 3]; 3];
        for (i, cell) in cells.into_iter().enumerate() {
            rows[i / Board::SIZE][i % Board::SIZE] = cell;
        }

        let turn = html
            .split_once(TURN_OPEN)
            .and_then(|(_, rest)| rest.get(..1))
            .and_then(|mark| mark.parse::<Mark>().ok())
            .ok_or_else(|| StoreError::new("missing turn line"))?;

        Ok(Snapshot::new(Board::from_rows(rows), turn, Status::Waiting))
    }
}

/// One-line human summary of the status.
fn headline(snapshot: &Snapshot) -> String {
    match snapshot.status() {
        Status::Waiting => "Waiting for players".to_string(),
        Status::Ongoing => "Game in progress".to_string(),
        Status::Win => format!("Player {} Wins!", snapshot.turn().opponent()),
        Status::Lose => format!("Player {} Wins!", snapshot.turn()),
        Status::Draw => "It's a Draw!".to_string(),
    }
}

impl SnapshotStore for HtmlStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        if !self.path.exists() {
            debug!("No saved page");
            return Ok(None);
        }
        let html = std::fs::read_to_string(&self.path)?;
        let snapshot = Self::parse(&html)?;
        info!(state = %snapshot, "Loaded saved page");
        Ok(Some(snapshot))
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display()))]
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        std::fs::write(&self.path, Self::render(snapshot))?;
        debug!(state = %snapshot, "Saved page");
        Ok(())
    }
}
