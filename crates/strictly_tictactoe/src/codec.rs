//! Single-line text encoding of snapshots.
//!
//! Grammar: three rows separated by `;`, each of three cells separated by `,`
//! (`X`, `O` or `-`), then `currentPlayer=<X|O>;result=<status>;`.
//!
//! ```text
//! X,-,-;O,-,-;X,O,-;currentPlayer=X;result=ongoing;
//! ```

use crate::snapshot::{Snapshot, Status};
use crate::types::{Board, Cell, Mark};
use std::str::FromStr;
use tracing::instrument;

const PLAYER_KEY: &str = "currentPlayer";
const RESULT_KEY: &str = "result";

/// Why a snapshot line could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CodecError {
    /// Fewer than three board rows.
    #[display("expected 3 board rows, found {_0}")]
    RowCount(#[error(not(source))] usize),
    /// A row without exactly three cells.
    #[display("row {row} has {found} cells, expected 3")]
    CellCount {
        /// Zero-based row index.
        row: usize,
        /// Cells found.
        found: usize,
    },
    /// A cell that is not `X`, `O` or `-`.
    #[display("invalid cell {_0:?}")]
    Cell(#[error(not(source))] String),
    /// `currentPlayer` absent or not `X`/`O`.
    #[display("missing or invalid currentPlayer")]
    Player,
    /// `result` absent or not a known status.
    #[display("missing or invalid result")]
    Result,
}

/// Encodes a snapshot as one line of text (no trailing newline).
pub fn encode(snapshot: &Snapshot) -> String {
    let mut out = String::with_capacity(64);
    for row in snapshot.board().rows() {
        let cells: Vec<String> = row.iter().map(|c| c.symbol().to_string()).collect();
        out.push_str(&cells.join(","));
        out.push(';');
    }
    out.push_str(&format!("{PLAYER_KEY}={};", snapshot.turn()));
    out.push_str(&format!("{RESULT_KEY}={};", snapshot.status()));
    out
}

/// Decodes a line produced by [`encode`].
///
/// Metadata fields may appear in any order; unknown `key=value` fields are
/// ignored.
#[instrument]
pub fn decode(line: &str) -> Result<Snapshot, CodecError> {
    let parts: Vec<&str> = line.trim().split(';').collect();

    let mut rows = [[Cell::Empty; 3]; 3];
    for (i, row) in rows.iter_mut().enumerate() {
        let text = parts
            .get(i)
            .filter(|p| p.contains(','))
            .ok_or(CodecError::RowCount(i))?;
        let cells: Vec<&str> = text.split(',').collect();
        if cells.len() != Board::SIZE {
            return Err(CodecError::CellCount {
                row: i,
                found: cells.len(),
            });
        }
        for (slot, raw) in row.iter_mut().zip(cells) {
            let mut chars = raw.trim().chars();
            *slot = match (chars.next(), chars.next()) {
                (Some(symbol), None) => Cell::from_symbol(symbol),
                _ => None,
            }
            .ok_or_else(|| CodecError::Cell(raw.to_string()))?;
        }
    }

    let mut turn = None;
    let mut status = None;
    for part in parts.iter().skip(Board::SIZE) {
        match part.split_once('=') {
            Some((PLAYER_KEY, value)) => {
                turn = Some(Mark::from_str(value.trim()).map_err(|_| CodecError::Player)?);
            }
            Some((RESULT_KEY, value)) => {
                status = Some(Status::from_str(value.trim()).map_err(|_| CodecError::Result)?);
            }
            _ => {}
        }
    }

    Ok(Snapshot::new(
        Board::from_rows(rows),
        turn.ok_or(CodecError::Player)?,
        status.ok_or(CodecError::Result)?,
    ))
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&encode(self))
    }
}

impl FromStr for Snapshot {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}
