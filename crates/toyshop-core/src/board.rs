//! The 4×4 board of tile slots.
//!
//! This module contains:
//! - `Board`, a copy-on-write array of tile slots
//! - `CellContent`, the derived content of a single cell
//! - Cell lookups shared by the validator and the region resolver
//!
//! Tiles are held behind `Arc`, so cloning a board or deriving a new one
//! with [`Board::with_tile`] copies sixteen pointers and never a tile.

use crate::grid::{CellPos, TilePos, SLOT_COUNT};
use crate::tile::{Block, BlockKind, Category, Tile};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What occupies a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellContent {
    /// No tile in this slot, or the cell is off the board
    Absent,
    /// A connector block
    Connector,
    /// A goods block of this category
    Goods(Category),
}

/// Board mutations that cannot be applied
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum BoardError {
    #[error("slot {0} is already occupied")]
    SlotOccupied(TilePos),

    #[error("board snapshot has {0} slots, expected 16")]
    WrongSlotCount(usize),
}

/// A player's board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BoardJson", into = "BoardJson")]
pub struct Board {
    slots: [Option<Arc<Tile>>; SLOT_COUNT],
    /// Bit per occupied slot
    occupied: u16,
    /// Bit per empty slot with an occupied neighbour
    frontier: u16,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board
    pub fn new() -> Self {
        Self {
            slots: Default::default(),
            occupied: 0,
            frontier: 0,
        }
    }

    /// A board holding only its starter tile
    pub fn with_starter(pos: TilePos, starter: Tile) -> Self {
        let mut board = Self::new();
        board.insert(pos, Arc::new(starter));
        board
    }

    // ==================== Queries ====================

    pub fn get(&self, pos: TilePos) -> Option<&Tile> {
        self.slots[pos.index()].as_deref()
    }

    /// The shared handle for a slot's tile
    pub fn get_shared(&self, pos: TilePos) -> Option<&Arc<Tile>> {
        self.slots[pos.index()].as_ref()
    }

    pub fn is_occupied(&self, pos: TilePos) -> bool {
        self.occupied & pos.bit() != 0
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    pub fn is_full(&self) -> bool {
        self.occupied_count() == SLOT_COUNT
    }

    /// Bit per empty slot touching at least one occupied slot
    pub fn frontier_mask(&self) -> u16 {
        self.frontier
    }

    /// Occupied slots and their tiles, in row-major order
    pub fn tiles(&self) -> impl Iterator<Item = (TilePos, &Tile)> {
        TilePos::all().filter_map(move |pos| self.get(pos).map(|tile| (pos, tile)))
    }

    /// The block covering a cell, or `None` for empty or off-board cells
    pub fn block_at(&self, cell: CellPos) -> Option<&Block> {
        let pos = cell.tile_pos()?;
        self.get(pos)?.block_at(cell.cell_index())
    }

    /// What occupies a cell.
    ///
    /// Safe for any coordinates: cells off the board are `Absent`.
    pub fn category_at(&self, cell: CellPos) -> CellContent {
        match self.block_at(cell).map(|b| b.kind) {
            None => CellContent::Absent,
            Some(BlockKind::Connector) => CellContent::Connector,
            Some(BlockKind::Goods { category, .. }) => CellContent::Goods(category),
        }
    }

    // ==================== Copy-on-write updates ====================

    /// A new board with `tile` in the slot at `pos`; `self` is untouched
    pub fn with_tile(&self, pos: TilePos, tile: Arc<Tile>) -> Result<Board, BoardError> {
        if self.is_occupied(pos) {
            return Err(BoardError::SlotOccupied(pos));
        }
        let mut next = self.clone();
        next.insert(pos, tile);
        Ok(next)
    }

    fn insert(&mut self, pos: TilePos, tile: Arc<Tile>) {
        self.slots[pos.index()] = Some(tile);
        self.occupied |= pos.bit();
        self.frontier = (self.frontier | pos.neighbor_mask()) & !self.occupied;
    }
}

/// Serialized form of a board: slots in row-major order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardJson {
    pub slots: Vec<Option<Arc<Tile>>>,
}

impl From<Board> for BoardJson {
    fn from(board: Board) -> Self {
        Self {
            slots: board.slots.into_iter().collect(),
        }
    }
}

impl TryFrom<BoardJson> for Board {
    type Error = BoardError;

    fn try_from(json: BoardJson) -> Result<Self, Self::Error> {
        if json.slots.len() != SLOT_COUNT {
            return Err(BoardError::WrongSlotCount(json.slots.len()));
        }
        let mut board = Board::new();
        for (index, slot) in json.slots.into_iter().enumerate() {
            if let (Some(tile), Some(pos)) = (slot, TilePos::from_index(index)) {
                board.insert(pos, tile);
            }
        }
        Ok(board)
    }
}

impl fmt::Display for Board {
    /// Cell map: `.` empty, `*` connector, category index otherwise
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..8 {
            for col in 0..8 {
                let symbol = match self.category_at(CellPos::new(row, col)) {
                    CellContent::Absent => '.',
                    CellContent::Connector => '*',
                    CellContent::Goods(category) => {
                        char::from_digit(category.0 as u32 % 36, 36).unwrap_or('?')
                    }
                };
                write!(f, "{}", symbol)?;
                if col % 2 == 1 && col < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
