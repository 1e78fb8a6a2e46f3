//! Move lines sent by peers.

use crate::types::Board;
use std::str::FromStr;

/// A requested placement at `(row, col)`, both within 0..=2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    row: usize,
    col: usize,
}

impl Move {
    /// Creates a move, rejecting coordinates outside the board.
    pub fn new(row: usize, col: usize) -> Result<Self, MoveParseError> {
        if row >= Board::SIZE || col >= Board::SIZE {
            return Err(MoveParseError::OutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    /// Row index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.col
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// Why a move line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveParseError {
    /// Not of the form `<row>,<col>`.
    #[display("expected '<row>,<col>', got {_0:?}")]
    Format(#[error(not(source))] String),
    /// A coordinate is not a non-negative integer.
    #[display("coordinate {_0:?} is not a number")]
    NotANumber(#[error(not(source))] String),
    /// A coordinate lies outside the board.
    #[display("coordinate ({row}, {col}) is outside 0..=2")]
    OutOfRange {
        /// Parsed row.
        row: usize,
        /// Parsed column.
        col: usize,
    },
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .trim()
            .split_once(',')
            .ok_or_else(|| MoveParseError::Format(s.to_string()))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| MoveParseError::NotANumber(part.trim().to_string()))
        };
        Move::new(parse(row)?, parse(col)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_move() {
        let mv: Move = "2,1".parse().unwrap();
        assert_eq!((mv.row(), mv.col()), (2, 1));
        assert_eq!(mv.to_string(), "2,1");
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let mv: Move = " 0 , 2 ".parse().unwrap();
        assert_eq!((mv.row(), mv.col()), (0, 2));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("11".parse::<Move>(), Err(MoveParseError::Format(_))));
        assert!(matches!(
            "a,1".parse::<Move>(),
            Err(MoveParseError::NotANumber(_))
        ));
        assert!(matches!(
            "-1,1".parse::<Move>(),
            Err(MoveParseError::NotANumber(_))
        ));
        assert!(matches!(
            "1,2,3".parse::<Move>(),
            Err(MoveParseError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            "3,0".parse::<Move>(),
            Err(MoveParseError::OutOfRange { row: 3, col: 0 })
        );
    }
}
