//! Coordinate system for the shop board.
//!
//! The board is a 4×4 grid of tile slots. Every tile covers a 2×2 block of
//! cells, so the same board is also an 8×8 grid of cells:
//! - `TilePos`: identifies a tile slot (row, col in `0..4`)
//! - `CellPos`: identifies a single cell (row, col in `0..8`)
//! - `Direction`: the four orthogonal neighbours used by both grids
//!
//! Cells inside a tile are numbered row-major:
//!
//! ```text
//! +---+---+
//! | 0 | 1 |
//! +---+---+
//! | 2 | 3 |
//! +---+---+
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of the board, in tiles
pub const BOARD_SIZE: u8 = 4;

/// Width and height of the board, in cells
pub const CELL_GRID_SIZE: u8 = BOARD_SIZE * 2;

/// Number of tile slots on a board
pub const SLOT_COUNT: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);

/// Orthogonal direction on either grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions, clockwise from North
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// (row, col) step for this direction
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }
}

/// A tile slot on the 4×4 board.
///
/// Always in bounds: every constructor checks its coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "(u8, u8)", into = "(u8, u8)")]
pub struct TilePos {
    row: u8,
    col: u8,
}

/// Coordinates that fall outside the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("position ({row}, {col}) is outside the {size}x{size} grid")]
pub struct OutOfBounds {
    pub row: i32,
    pub col: i32,
    pub size: u8,
}

impl TilePos {
    /// Create a slot position, rejecting coordinates outside the board
    pub fn new(row: i32, col: i32) -> Result<Self, OutOfBounds> {
        if in_range(row, BOARD_SIZE) && in_range(col, BOARD_SIZE) {
            Ok(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(OutOfBounds {
                row,
                col,
                size: BOARD_SIZE,
            })
        }
    }

    /// Slot from coordinates known to be on the board.
    ///
    /// Panics (at compile time in const contexts) if they are not.
    pub const fn at(row: u8, col: u8) -> Self {
        assert!(row < BOARD_SIZE && col < BOARD_SIZE, "tile position off the board");
        Self { row, col }
    }

    /// Slot for a row-major index in `0..16`
    pub fn from_index(index: usize) -> Option<Self> {
        if index < SLOT_COUNT {
            let size = BOARD_SIZE as usize;
            Some(Self {
                row: (index / size) as u8,
                col: (index % size) as u8,
            })
        } else {
            None
        }
    }

    /// Every slot on the board in row-major order
    pub fn all() -> impl Iterator<Item = TilePos> {
        (0..SLOT_COUNT).filter_map(TilePos::from_index)
    }

    pub const fn row(self) -> u8 {
        self.row
    }

    pub const fn col(self) -> u8 {
        self.col
    }

    /// Row-major index in `0..16`
    pub const fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }

    /// Single-bit mask for this slot (bit = row-major index)
    pub const fn bit(self) -> u16 {
        1 << self.index()
    }

    /// The neighbouring slot in a direction, if it is on the board
    pub fn neighbor(self, direction: Direction) -> Option<TilePos> {
        let (dr, dc) = direction.delta();
        TilePos::new(self.row as i32 + dr, self.col as i32 + dc).ok()
    }

    /// All on-board neighbours (2 to 4 of them)
    pub fn neighbors(self) -> impl Iterator<Item = TilePos> {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.neighbor(dir))
    }

    /// Bitmask of all on-board neighbours
    pub fn neighbor_mask(self) -> u16 {
        self.neighbors().fold(0, |mask, pos| mask | pos.bit())
    }

    /// Cell at a local cell index (`0..4`) of this tile
    pub fn cell(self, cell_index: u8) -> CellPos {
        debug_assert!(cell_index < 4);
        CellPos {
            row: self.row as i32 * 2 + (cell_index / 2) as i32,
            col: self.col as i32 * 2 + (cell_index % 2) as i32,
        }
    }

    /// The four cells covered by this tile, in cell-index order
    pub fn cells(self) -> [CellPos; 4] {
        [self.cell(0), self.cell(1), self.cell(2), self.cell(3)]
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl TryFrom<(u8, u8)> for TilePos {
    type Error = OutOfBounds;

    fn try_from((row, col): (u8, u8)) -> Result<Self, Self::Error> {
        TilePos::new(row as i32, col as i32)
    }
}

impl From<TilePos> for (u8, u8) {
    fn from(pos: TilePos) -> Self {
        (pos.row, pos.col)
    }
}

/// A cell on the 8×8 cell grid.
///
/// Unlike [`TilePos`], a `CellPos` may lie off the board. Lookups on such
/// cells simply find nothing, which keeps flood fills free of bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: i32,
    pub col: i32,
}

impl CellPos {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(self) -> bool {
        in_range(self.row, CELL_GRID_SIZE) && in_range(self.col, CELL_GRID_SIZE)
    }

    /// The tile slot holding this cell, or `None` off the board
    pub fn tile_pos(self) -> Option<TilePos> {
        if !self.is_on_board() {
            return None;
        }
        TilePos::new(self.row.div_euclid(2), self.col.div_euclid(2)).ok()
    }

    /// Index of this cell inside its tile (`0..4`)
    pub fn cell_index(self) -> u8 {
        (self.row.rem_euclid(2) * 2 + self.col.rem_euclid(2)) as u8
    }

    pub const fn neighbor(self, direction: Direction) -> CellPos {
        let (dr, dc) = direction.delta();
        CellPos::new(self.row + dr, self.col + dc)
    }

    /// The four orthogonal neighbours (possibly off the board)
    pub fn neighbors(self) -> [CellPos; 4] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

fn in_range(value: i32, size: u8) -> bool {
    (0..size as i32).contains(&value)
}
