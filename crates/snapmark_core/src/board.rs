//! Board, cell, and move types shared by the engine and the reconciler.

use serde::{Deserialize, Serialize};

/// A player's mark. `X` is the first-moving mark.
///
/// Which player holds `X` is decided by a coin flip at game creation
/// and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    /// The first-moving mark.
    X,
    /// The second-moving mark.
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// One cell of the board.
///
/// Serializes as `"X"`, `"O"`, or `"_"` so a board travels over the wire
/// as three rows of three short strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing has been played here.
    #[serde(rename = "_")]
    Empty,
    /// An `X` mark.
    X,
    /// An `O` mark.
    O,
}

impl Cell {
    /// Whether the cell holds no mark.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    /// The mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Mark::X),
            Cell::O => Some(Mark::O),
        }
    }

    /// Total mapping from recognized text to a cell.
    ///
    /// Glyph recognition on photographed boards yields characters, not
    /// cells; this folds them into the three-valued domain. A `'4'` is
    /// accepted as `X` because that is how recognizers habitually misread
    /// a hand-drawn X. Everything unrecognized is `Empty`.
    pub fn from_char(ch: char) -> Cell {
        match ch {
            'o' | 'O' => Cell::O,
            'x' | 'X' | '4' => Cell::X,
            _ => Cell::Empty,
        }
    }
}

impl From<Mark> for Cell {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Cell::X,
            Mark::O => Cell::O,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => write!(f, "_"),
            Cell::X => write!(f, "X"),
            Cell::O => write!(f, "O"),
        }
    }
}

/// A move target: row and column, each in `[0, 2]`.
///
/// Construction is validated, so a `Move` held anywhere in the program
/// is always a legal board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    row: usize,
    col: usize,
}

impl Move {
    /// Creates a move, or `None` if either coordinate is off the board.
    pub fn new(row: usize, col: usize) -> Option<Move> {
        if row < 3 && col < 3 {
            Some(Move { row, col })
        } else {
            None
        }
    }

    /// Row index (0 is the top row).
    pub fn row(self) -> usize {
        self.row
    }

    /// Column index (0 is the left column).
    pub fn col(self) -> usize {
        self.col
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The 3x3 grid, row-major. Always exactly 3x3, never resized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; 3]; 3],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; 3]; 3],
        }
    }

    /// Builds a board from explicit rows. Handy for tests and replays.
    pub fn from_rows(cells: [[Cell; 3]; 3]) -> Self {
        Self { cells }
    }

    /// The cell at the given coordinate.
    pub fn get(&self, mv: Move) -> Cell {
        self.cells[mv.row][mv.col]
    }

    /// Writes a cell at the given coordinate.
    pub fn set(&mut self, mv: Move, cell: Cell) {
        self.cells[mv.row][mv.col] = cell;
    }

    /// Whether the cell at the given coordinate is empty.
    pub fn is_empty(&self, mv: Move) -> bool {
        self.get(mv).is_empty()
    }

    /// All cells in row-major order, with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Move, Cell)> + '_ {
        (0..3).flat_map(move |row| {
            (0..3).map(move |col| {
                let mv = Move { row, col };
                (mv, self.get(mv))
            })
        })
    }

    /// The three cells of a row. `row` must be in `[0, 2]`.
    pub fn row(&self, row: usize) -> [Cell; 3] {
        self.cells[row]
    }

    /// The three cells of a column. `col` must be in `[0, 2]`.
    pub fn column(&self, col: usize) -> [Cell; 3] {
        [self.cells[0][col], self.cells[1][col], self.cells[2][col]]
    }

    /// The main diagonal, top-left to bottom-right.
    pub fn diagonal(&self) -> [Cell; 3] {
        [self.cells[0][0], self.cells[1][1], self.cells[2][2]]
    }

    /// The anti-diagonal, top-right to bottom-left.
    pub fn anti_diagonal(&self) -> [Cell; 3] {
        [self.cells[0][2], self.cells[1][1], self.cells[2][0]]
    }

    /// Count of non-empty cells.
    pub fn filled(&self) -> usize {
        self.iter().filter(|(_, cell)| !cell.is_empty()).count()
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                result.push_str(&self.cells[row][col].to_string());
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
