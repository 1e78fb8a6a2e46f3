//! Core domain types for tic-tac-toe.

use tracing::instrument;

/// A player's mark.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
pub enum Mark {
    /// Mark X (always moves first).
    X,
    /// Mark O.
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Returns the single-character symbol used on the wire.
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Empty cell.
    Empty,
    /// Cell occupied by a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the wire symbol: `X`, `O` or `-`.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Occupied(mark) => mark.symbol(),
        }
    }

    /// Parses a wire symbol back into a cell.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '-' => Some(Cell::Empty),
            'X' => Some(Cell::Occupied(Mark::X)),
            'O' => Some(Cell::Occupied(Mark::O)),
            _ => None,
        }
    }
}

/// All eight winning lines as `(row, col)` triples.
const LINES: [[(usize, usize); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// 3x3 tic-tac-toe board, indexed by `(row, col)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; 3]; 3],
}

impl Board {
    /// Side length of the board.
    pub const SIZE: usize = 3;

    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; 3]; 3],
        }
    }

    /// Builds a board from rows of cells.
    pub fn from_rows(cells: [[Cell; 3]; 3]) -> Self {
        Self { cells }
    }

    /// Gets the cell at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Returns all rows.
    pub fn rows(&self) -> &[[Cell; 3]; 3] {
        &self.cells
    }

    /// Writes a cell. Bounds are checked by the caller.
    pub(crate) fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// True iff no empty cell remains.
    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|c| *c != Cell::Empty)
    }

    /// True iff any row, column or diagonal is entirely `mark`.
    #[instrument(skip(self))]
    pub fn has_line(&self, mark: Mark) -> bool {
        let target = Cell::Occupied(mark);
        LINES
            .iter()
            .any(|line| line.iter().all(|&(r, c)| self.cells[r][c] == target))
    }

    /// Coordinates of every empty cell in row-major order.
    pub fn free_cells(&self) -> Vec<(usize, usize)> {
        (0..Self::SIZE)
            .flat_map(|row| (0..Self::SIZE).map(move |col| (row, col)))
            .filter(|&(row, col)| self.cells[row][col] == Cell::Empty)
            .collect()
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Cell::Empty => ' ',
                        Cell::Occupied(m) => m.symbol(),
                    })
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect::<Vec<_>>()
            .join("\n-+-+-\n")
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(cells: &[(usize, usize, Mark)]) -> Board {
        let mut board = Board::new();
        for &(r, c, m) in cells {
            board.set(r, c, Cell::Occupied(m));
        }
        board
    }

    #[test]
    fn test_empty_board_has_no_line() {
        let board = Board::new();
        assert!(!board.has_line(Mark::X));
        assert!(!board.has_line(Mark::O));
        assert!(!board.is_full());
        assert_eq!(board.free_cells().len(), 9);
    }

    #[test]
    fn test_row_column_and_diagonal_lines() {
        let row = board_with(&[(1, 0, Mark::X), (1, 1, Mark::X), (1, 2, Mark::X)]);
        assert!(row.has_line(Mark::X));
        assert!(!row.has_line(Mark::O));

        let col = board_with(&[(0, 2, Mark::O), (1, 2, Mark::O), (2, 2, Mark::O)]);
        assert!(col.has_line(Mark::O));

        let anti = board_with(&[(0, 2, Mark::X), (1, 1, Mark::X), (2, 0, Mark::X)]);
        assert!(anti.has_line(Mark::X));
    }

    #[test]
    fn test_incomplete_line_is_not_a_line() {
        let board = board_with(&[(0, 0, Mark::X), (0, 1, Mark::X), (0, 2, Mark::O)]);
        assert!(!board.has_line(Mark::X));
    }

    #[test]
    fn test_get_out_of_bounds() {
        let board = Board::new();
        assert_eq!(board.get(0, 0), Some(Cell::Empty));
        assert_eq!(board.get(3, 0), None);
        assert_eq!(board.get(0, 3), None);
    }

    #[test]
    fn test_symbols_round_trip() {
        for cell in [Cell::Empty, Cell::Occupied(Mark::X), Cell::Occupied(Mark::O)] {
            assert_eq!(Cell::from_symbol(cell.symbol()), Some(cell));
        }
        assert_eq!(Cell::from_symbol('x'), None);
    }

    #[test]
    fn test_display_grid() {
        let board = board_with(&[(0, 0, Mark::X), (2, 2, Mark::O)]);
        assert_eq!(board.display(), "X| | \n-+-+-\n | | \n-+-+-\n | |O");
    }
}
