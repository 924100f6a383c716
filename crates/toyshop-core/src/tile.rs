//! Tiles and the blocks they are made of.
//!
//! This module contains:
//! - `Category` and `ItemId`, indices into the rule set's goods table
//! - `CellSet`, a 4-bit set of cell indices inside one tile
//! - `Block`, a coloured (or connector) region of a tile
//! - `Tile`, an immutable partition of the 2×2 cell area into blocks

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A goods category (a colour on the board), indexing `RuleSet::categories`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Category(pub u8);

impl Category {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category#{}", self.0)
    }
}

/// A specific collectible within a category, indexing that category's items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u8);

impl ItemId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique tile identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(pub u32);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile_{}", self.0)
    }
}

/// Set of cell indices (`0..4`) within a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CellSet {
    bits: u8,
}

impl TryFrom<u8> for CellSet {
    type Error = TileError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        if bits & !CellSet::FULL.bits != 0 {
            return Err(TileError::CellMaskOutOfRange(bits));
        }
        Ok(Self { bits })
    }
}

impl From<CellSet> for u8 {
    fn from(set: CellSet) -> Self {
        set.bits
    }
}

impl CellSet {
    pub const EMPTY: CellSet = CellSet { bits: 0 };
    pub const FULL: CellSet = CellSet { bits: 0b1111 };

    /// Top row, bottom row, left column, right column
    pub const TOP: CellSet = CellSet { bits: 0b0011 };
    pub const BOTTOM: CellSet = CellSet { bits: 0b1100 };
    pub const LEFT: CellSet = CellSet { bits: 0b0101 };
    pub const RIGHT: CellSet = CellSet { bits: 0b1010 };

    /// The four legal halves of a tile
    pub const HALVES: [CellSet; 4] = [CellSet::TOP, CellSet::BOTTOM, CellSet::LEFT, CellSet::RIGHT];

    /// Build from cell indices; indices `>= 4` are ignored
    pub fn from_indices(indices: &[u8]) -> Self {
        let bits = indices
            .iter()
            .filter(|&&i| i < 4)
            .fold(0u8, |bits, &i| bits | (1 << i));
        Self { bits }
    }

    pub const fn single(index: u8) -> Self {
        Self {
            bits: (1 << index) & 0b1111,
        }
    }

    pub const fn contains(self, index: u8) -> bool {
        index < 4 && self.bits & (1 << index) != 0
    }

    pub const fn len(self) -> u32 {
        self.bits.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub const fn union(self, other: CellSet) -> CellSet {
        CellSet {
            bits: self.bits | other.bits,
        }
    }

    pub const fn intersects(self, other: CellSet) -> bool {
        self.bits & other.bits != 0
    }

    pub const fn complement(self) -> CellSet {
        CellSet {
            bits: !self.bits & 0b1111,
        }
    }

    /// Cell indices in ascending order
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..4u8).filter(move |&i| self.contains(i))
    }

    /// Whether this set is a legal block shape (quarter, straight half, or full)
    pub fn is_block_shape(self) -> bool {
        match self.len() {
            1 => true,
            2 => CellSet::HALVES.contains(&self),
            4 => true,
            _ => false,
        }
    }
}

/// What a block holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Conducts adjacency for every category but never scores
    Connector,
    /// A collectible item of one category
    Goods { category: Category, item: ItemId },
}

impl BlockKind {
    pub fn category(&self) -> Option<Category> {
        match self {
            BlockKind::Connector => None,
            BlockKind::Goods { category, .. } => Some(*category),
        }
    }
}

/// A region of a tile: one, two or four cells sharing a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub cells: CellSet,
    pub kind: BlockKind,
}

impl Block {
    pub fn goods(cells: CellSet, category: Category, item: ItemId) -> Self {
        Self {
            cells,
            kind: BlockKind::Goods { category, item },
        }
    }

    pub fn connector(cells: CellSet) -> Self {
        Self {
            cells,
            kind: BlockKind::Connector,
        }
    }

    pub fn category(&self) -> Option<Category> {
        self.kind.category()
    }

    pub fn is_connector(&self) -> bool {
        matches!(self.kind, BlockKind::Connector)
    }
}

/// How a tile is split into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileLayout {
    /// One block covering all four cells
    Full,
    /// Two straight halves
    TwoHalves,
    /// One straight half and two single cells
    HalfAndTwoQuarters,
    /// Four single cells
    FourQuarters,
}

/// Reasons a block list does not make a tile
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TileError {
    #[error("tile has no blocks")]
    NoBlocks,

    #[error("block {index} has an illegal shape")]
    IllegalBlockShape { index: usize },

    #[error("block {index} overlaps an earlier block")]
    OverlappingBlocks { index: usize },

    #[error("blocks leave cells uncovered")]
    IncompleteCover,

    #[error("starter tiles may only contain connector blocks")]
    StarterWithGoods,

    #[error("cell mask {0:#06b} names cells outside the tile")]
    CellMaskOutOfRange(u8),
}

/// A placeable 2×2 tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TileJson", into = "TileJson")]
pub struct Tile {
    pub id: TileId,
    blocks: Vec<Block>,
    starter: bool,
}

/// Serialized form of a tile; loading it runs the same checks as `Tile::new`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileJson {
    pub id: TileId,
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub starter: bool,
}

impl From<Tile> for TileJson {
    fn from(tile: Tile) -> Self {
        Self {
            id: tile.id,
            blocks: tile.blocks,
            starter: tile.starter,
        }
    }
}

impl TryFrom<TileJson> for Tile {
    type Error = TileError;

    fn try_from(json: TileJson) -> Result<Self, Self::Error> {
        Tile::build(json.id, json.blocks, json.starter)
    }
}

impl Tile {
    /// Create a regular tile, checking that the blocks partition its cells
    pub fn new(id: TileId, blocks: Vec<Block>) -> Result<Self, TileError> {
        Self::build(id, blocks, false)
    }

    /// The connector-only tile every board starts with
    pub fn starter(id: TileId) -> Self {
        Self {
            id,
            blocks: vec![Block::connector(CellSet::FULL)],
            starter: true,
        }
    }

    /// A starter tile with a custom connector layout
    pub fn starter_with_blocks(id: TileId, blocks: Vec<Block>) -> Result<Self, TileError> {
        Self::build(id, blocks, true)
    }

    /// A single-category tile
    pub fn full(id: TileId, category: Category, item: ItemId) -> Self {
        Self {
            id,
            blocks: vec![Block::goods(CellSet::FULL, category, item)],
            starter: false,
        }
    }

    fn build(id: TileId, blocks: Vec<Block>, starter: bool) -> Result<Self, TileError> {
        if blocks.is_empty() {
            return Err(TileError::NoBlocks);
        }

        let mut covered = CellSet::EMPTY;
        for (index, block) in blocks.iter().enumerate() {
            if !block.cells.is_block_shape() {
                return Err(TileError::IllegalBlockShape { index });
            }
            if covered.intersects(block.cells) {
                return Err(TileError::OverlappingBlocks { index });
            }
            covered = covered.union(block.cells);
        }
        if covered != CellSet::FULL {
            return Err(TileError::IncompleteCover);
        }
        if starter && blocks.iter().any(|b| !b.is_connector()) {
            return Err(TileError::StarterWithGoods);
        }

        Ok(Self {
            id,
            blocks,
            starter,
        })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_starter(&self) -> bool {
        self.starter
    }

    /// The block covering a cell index, if the index is in `0..4`
    pub fn block_at(&self, cell_index: u8) -> Option<&Block> {
        self.blocks.iter().find(|b| b.cells.contains(cell_index))
    }

    /// Derive the layout from block sizes
    pub fn layout(&self) -> TileLayout {
        let mut sizes: Vec<u32> = self.blocks.iter().map(|b| b.cells.len()).collect();
        sizes.sort_unstable();
        match sizes.as_slice() {
            [4] => TileLayout::Full,
            [2, 2] => TileLayout::TwoHalves,
            [1, 1, 2] => TileLayout::HalfAndTwoQuarters,
            _ => TileLayout::FourQuarters,
        }
    }

    /// Goods blocks only (connectors never score or collect)
    pub fn goods(&self) -> impl Iterator<Item = (CellSet, Category, ItemId)> + '_ {
        self.blocks.iter().filter_map(|b| match b.kind {
            BlockKind::Goods { category, item } => Some((b.cells, category, item)),
            BlockKind::Connector => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAKERY: Category = Category(0);
    const CANDY: Category = Category(3);

    #[test]
    fn test_cell_set_shapes() {
        assert!(CellSet::single(2).is_block_shape());
        assert!(CellSet::TOP.is_block_shape());
        assert!(CellSet::LEFT.is_block_shape());
        assert!(CellSet::FULL.is_block_shape());
        // Diagonals are not halves
        assert!(!CellSet::from_indices(&[0, 3]).is_block_shape());
        assert!(!CellSet::from_indices(&[0, 1, 2]).is_block_shape());
        assert!(!CellSet::EMPTY.is_block_shape());
    }

    #[test]
    fn test_cell_set_iter_and_complement() {
        let set = CellSet::from_indices(&[1, 3]);
        assert_eq!(set, CellSet::RIGHT);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(set.complement(), CellSet::LEFT);
    }

    #[test]
    fn test_two_halves_tile() {
        let tile = Tile::new(
            TileId(1),
            vec![
                Block::goods(CellSet::TOP, BAKERY, ItemId(0)),
                Block::goods(CellSet::BOTTOM, CANDY, ItemId(2)),
            ],
        )
        .unwrap();

        assert_eq!(tile.layout(), TileLayout::TwoHalves);
        assert_eq!(tile.block_at(1).and_then(Block::category), Some(BAKERY));
        assert_eq!(tile.block_at(2).and_then(Block::category), Some(CANDY));
        assert!(tile.block_at(4).is_none());
        assert!(!tile.is_starter());
    }

    #[test]
    fn test_rejects_overlap_and_gaps() {
        let overlap = Tile::new(
            TileId(1),
            vec![
                Block::goods(CellSet::TOP, BAKERY, ItemId(0)),
                Block::goods(CellSet::LEFT, CANDY, ItemId(0)),
            ],
        );
        assert_eq!(overlap, Err(TileError::OverlappingBlocks { index: 1 }));

        let gap = Tile::new(TileId(1), vec![Block::goods(CellSet::TOP, BAKERY, ItemId(0))]);
        assert_eq!(gap, Err(TileError::IncompleteCover));

        assert_eq!(Tile::new(TileId(1), vec![]), Err(TileError::NoBlocks));
    }

    #[test]
    fn test_rejects_diagonal_half() {
        let tile = Tile::new(
            TileId(1),
            vec![
                Block::goods(CellSet::from_indices(&[0, 3]), BAKERY, ItemId(0)),
                Block::goods(CellSet::from_indices(&[1, 2]), CANDY, ItemId(0)),
            ],
        );
        assert_eq!(tile, Err(TileError::IllegalBlockShape { index: 0 }));
    }

    #[test]
    fn test_starter_tile() {
        let starter = Tile::starter(TileId(0));
        assert!(starter.is_starter());
        assert_eq!(starter.layout(), TileLayout::Full);
        assert_eq!(starter.goods().count(), 0);

        let bad = Tile::starter_with_blocks(
            TileId(0),
            vec![
                Block::connector(CellSet::TOP),
                Block::goods(CellSet::BOTTOM, BAKERY, ItemId(0)),
            ],
        );
        assert_eq!(bad, Err(TileError::StarterWithGoods));
    }

    #[test]
    fn test_layout_detection() {
        let half_quarters = Tile::new(
            TileId(2),
            vec![
                Block::goods(CellSet::RIGHT, BAKERY, ItemId(1)),
                Block::goods(CellSet::single(0), CANDY, ItemId(0)),
                Block::goods(CellSet::single(2), CANDY, ItemId(1)),
            ],
        )
        .unwrap();
        assert_eq!(half_quarters.layout(), TileLayout::HalfAndTwoQuarters);

        let quarters = Tile::new(
            TileId(3),
            (0..4)
                .map(|i| Block::goods(CellSet::single(i), BAKERY, ItemId(i)))
                .collect(),
        )
        .unwrap();
        assert_eq!(quarters.layout(), TileLayout::FourQuarters);
    }

    #[test]
    fn test_tile_json_roundtrip() {
        let tile = Tile::new(
            TileId(4),
            vec![
                Block::goods(CellSet::LEFT, BAKERY, ItemId(1)),
                Block::connector(CellSet::RIGHT),
            ],
        )
        .unwrap();
        let json = serde_json::to_string(&tile).unwrap();
        let restored: Tile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, tile);

        let json = serde_json::to_string(&Tile::starter(TileId(0))).unwrap();
        let starter: Tile = serde_json::from_str(&json).unwrap();
        assert!(starter.is_starter());
    }

    #[test]
    fn test_loading_tile_rejects_gap() {
        let json = r#"{"id":1,"blocks":[{"cells":1,"kind":{"Goods":{"category":0,"item":0}}}]}"#;
        let err = serde_json::from_str::<Tile>(json).unwrap_err();
        assert!(err.to_string().contains("uncovered"));
    }

    #[test]
    fn test_loading_tile_rejects_goods_on_starter() {
        let json = r#"{"id":0,"blocks":[{"cells":15,"kind":{"Goods":{"category":0,"item":0}}}],"starter":true}"#;
        assert!(serde_json::from_str::<Tile>(json).is_err());
    }

    #[test]
    fn test_loading_cell_mask_rejects_high_bits() {
        assert!(serde_json::from_str::<CellSet>("255").is_err());
        assert!(serde_json::from_str::<CellSet>("16").is_err());
        assert_eq!(serde_json::from_str::<CellSet>("10").unwrap(), CellSet::RIGHT);

        let json = r#"{"id":1,"blocks":[{"cells":255,"kind":{"Goods":{"category":0,"item":0}}}]}"#;
        assert!(serde_json::from_str::<Tile>(json).is_err());
    }
}
