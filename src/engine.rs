use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the board.
pub const SIZE: usize = 4;

/// Tile value whose presence ends the game in a win.
pub const WIN_TILE: u32 = 2048;

type Rows = [[u32; SIZE]; SIZE];
type Score = u64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// The four directions in a fixed order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        write!(f, "{}", name)
    }
}

/// Rejected board configurations, surfaced at the construction boundary.
///
/// Once a `Board` exists every operation on it is total; validation only
/// happens when a grid crosses into the engine from outside.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("expected a 4x4 grid, got {0} rows")]
    RowCount(usize),
    #[error("row {row} has {len} cells, expected 4")]
    RowLength { row: usize, len: usize },
    #[error("tile at row {row}, column {col} is not 0 or a power of two: {value}")]
    InvalidTile { row: usize, col: usize, value: u32 },
}

/// A 4x4 2048 board holding literal tile values; 0 marks an empty cell.
///
/// `Board` is a small `Copy` value: operations return new boards instead of
/// mutating in place, so handing one out never exposes internal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Rows", into = "Rows")]
pub struct Board(Rows);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Construct a `Board` from a fixed-size grid, checking every cell is
    /// 0 or a power of two (2 or greater).
    ///
    /// ```
    /// use game_2048::engine::Board;
    /// assert!(Board::from_rows([[2, 4, 2048, 0], [0; 4], [0; 4], [0; 4]]).is_ok());
    /// assert!(Board::from_rows([[3, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).is_err());
    /// ```
    pub fn from_rows(rows: Rows) -> Result<Self, BoardError> {
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if !valid_tile(value) {
                    return Err(BoardError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Board(rows))
    }

    /// Copy out the grid as plain rows of tile values.
    #[inline]
    pub fn rows(&self) -> Rows {
        self.0
    }

    /// The tile value at `(row, col)`, 0 if the cell is empty.
    #[inline]
    pub fn tile(&self, row: usize, col: usize) -> u32 {
        self.0[row][col]
    }

    /// Slide and merge all tiles toward `dir`, returning the new board and
    /// the score gained by merges. Purely deterministic; the random spawn
    /// step lives in [`Board::with_random_tile`].
    ///
    /// ```
    /// use game_2048::engine::{Board, Move};
    /// let board = Board::from_rows([[2, 2, 4, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// let (shifted, gained) = board.shift(Move::Left);
    /// assert_eq!(shifted.rows()[0], [4, 4, 0, 0]);
    /// assert_eq!(gained, 4);
    /// ```
    pub fn shift(self, dir: Move) -> (Board, Score) {
        let mut oriented = self.oriented(dir);
        let mut gained = 0;
        for row in &mut oriented.0 {
            let (merged, score) = slide_row(*row);
            *row = merged;
            gained += score;
        }
        (oriented.restored(dir), gained)
    }

    /// Place a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty
    /// cell, using the provided RNG. Returns the board unchanged when no
    /// empty cell exists.
    ///
    /// ```
    /// use game_2048::engine::Board;
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(mut self, rng: &mut R) -> Board {
        let empties = self.empty_cells();
        if let Some(&(row, col)) = empties.choose(rng) {
            self.0[row][col] = random_tile_value(rng);
        }
        self
    }

    /// Convenience: like `with_random_tile` but uses thread-local RNG.
    pub fn with_random_tile_thread(self) -> Board {
        self.with_random_tile(&mut rand::thread_rng())
    }

    /// Coordinates of all empty cells, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (row, line) in self.0.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                if value == 0 {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    /// Count the number of empty cells on the board.
    pub fn count_empty(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// The highest tile value present, 0 on an empty board.
    pub fn highest_tile(&self) -> u32 {
        self.0.iter().flatten().copied().max().unwrap_or(0)
    }

    /// True if any move can still change the board: an empty cell exists,
    /// or two equal tiles sit next to each other in a row or column.
    pub fn has_moves(&self) -> bool {
        for row in 0..SIZE {
            for col in 0..SIZE {
                if self.0[row][col] == 0 {
                    return true;
                }
                if col + 1 < SIZE && self.0[row][col] == self.0[row][col + 1] {
                    return true;
                }
                if row + 1 < SIZE && self.0[row][col] == self.0[row + 1][col] {
                    return true;
                }
            }
        }
        false
    }

    /// Reorient the board so that sliding toward `dir` becomes a slide to
    /// the left.
    fn oriented(self, dir: Move) -> Board {
        match dir {
            Move::Left => self,
            Move::Right => self.reversed_rows(),
            Move::Up => self.transposed(),
            Move::Down => self.transposed().reversed_rows(),
        }
    }

    /// Undo [`Board::oriented`]; the `Down` case unwinds in reverse order.
    fn restored(self, dir: Move) -> Board {
        match dir {
            Move::Left => self,
            Move::Right => self.reversed_rows(),
            Move::Up => self.transposed(),
            Move::Down => self.reversed_rows().transposed(),
        }
    }

    fn transposed(self) -> Board {
        let mut out = [[0; SIZE]; SIZE];
        for (row, line) in self.0.iter().enumerate() {
            for (col, &value) in line.iter().enumerate() {
                out[col][row] = value;
            }
        }
        Board(out)
    }

    fn reversed_rows(mut self) -> Board {
        for row in &mut self.0 {
            row.reverse();
        }
        self
    }
}

impl From<Board> for Rows {
    fn from(board: Board) -> Rows {
        board.0
    }
}

impl TryFrom<Rows> for Board {
    type Error = BoardError;

    fn try_from(rows: Rows) -> Result<Self, BoardError> {
        Board::from_rows(rows)
    }
}

impl TryFrom<&[Vec<u32>]> for Board {
    type Error = BoardError;

    /// Shape-checked entry point for grids coming from a collaborator
    /// (a deserialized save, a UI layer) rather than literal code.
    fn try_from(rows: &[Vec<u32>]) -> Result<Self, BoardError> {
        if rows.len() != SIZE {
            return Err(BoardError::RowCount(rows.len()));
        }
        let mut grid = [[0; SIZE]; SIZE];
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != SIZE {
                return Err(BoardError::RowLength { row, len: cells.len() });
            }
            grid[row].copy_from_slice(cells);
        }
        Board::from_rows(grid)
    }
}

impl TryFrom<Vec<Vec<u32>>> for Board {
    type Error = BoardError;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self, BoardError> {
        Board::try_from(rows.as_slice())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f, "{}", "-".repeat(SIZE * 7 - 1))?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_tile(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

fn format_tile(value: u32) -> String {
    if value == 0 {
        " ".repeat(6)
    } else {
        format!("{:^6}", value)
    }
}

fn valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

/// Compact a row to the left and merge equal neighbors, left to right.
///
/// A freshly merged tile never merges again in the same pass: the scan
/// consumes both sources and moves on to the next un-merged tile.
fn slide_row(row: [u32; SIZE]) -> ([u32; SIZE], Score) {
    let tiles: Vec<u32> = row.iter().copied().filter(|&v| v != 0).collect();
    let mut out = [0; SIZE];
    let mut gained = 0;
    let mut write = 0;
    let mut read = 0;
    while read < tiles.len() {
        if read + 1 < tiles.len() && tiles[read] == tiles[read + 1] {
            let merged = tiles[read] * 2;
            out[write] = merged;
            gained += Score::from(merged);
            read += 2;
        } else {
            out[write] = tiles[read];
            read += 1;
        }
        write += 1;
    }
    (out, gained)
}

fn random_tile_value<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    // Uniform draw over 0..=100; the bottom 11 ticks yield a 4.
    if rng.gen_range(0..=100u32) <= 10 {
        4
    } else {
        2
    }
}
