//! Placement scoring.
//!
//! Scoring works on a working copy of the board with the new tile inserted.
//! Every goods cell of the new tile seeds a flood fill for its category; the
//! cells each fill returns are marked so a region reached from several blocks
//! of the same tile is only counted once. A region scores when it holds at
//! least one matching cell outside the new tile.
//!
//! How big a region's payout is depends on the [`RegionScoring`] strategy in
//! force. The rule set picks one through [`ScoringRule`].

use crate::board::{Board, BoardError, CellContent};
use crate::grid::{CellPos, TilePos};
use crate::region::{find_region, Region};
use crate::tile::{Category, Tile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::trace;

/// Per-tile payout for the tile-count convention
pub const DEFAULT_TILE_MULTIPLIER: u32 = 2;

/// Turns a connected region into a payout
pub trait RegionScoring {
    /// Payout for a region that reaches beyond the new tile
    fn magnitude(&self, region: &Region) -> u32;

    /// Payout when nothing scored but the new tile touches a connector
    fn connector_floor(&self) -> u32 {
        0
    }
}

/// The built-in scoring conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringRule {
    /// One coin per matching cell in the region; touching a connector
    /// without joining a region earns a single coin
    #[default]
    CellCount,
    /// `multiplier` coins per distinct tile in the region; needs two tiles
    TileCount { multiplier: u32 },
}

impl ScoringRule {
    /// Tile-count scoring with the standard multiplier
    pub const fn tile_count() -> Self {
        ScoringRule::TileCount {
            multiplier: DEFAULT_TILE_MULTIPLIER,
        }
    }
}

impl RegionScoring for ScoringRule {
    fn magnitude(&self, region: &Region) -> u32 {
        match *self {
            ScoringRule::CellCount => {
                if region.size() >= 2 {
                    region.size() as u32
                } else {
                    0
                }
            }
            ScoringRule::TileCount { multiplier } => {
                let tiles = region.tiles().len() as u32;
                if tiles >= 2 {
                    tiles * multiplier
                } else {
                    0
                }
            }
        }
    }

    fn connector_floor(&self) -> u32 {
        match self {
            ScoringRule::CellCount => 1,
            ScoringRule::TileCount { .. } => 0,
        }
    }
}

/// One scored region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionScore {
    pub category: Category,
    pub magnitude: u32,
    /// Matching cells in the region
    pub cells: usize,
    /// Distinct tiles contributing matching cells
    pub tiles: usize,
}

/// Outcome of scoring one placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total: u32,
    pub per_region: Vec<RegionScore>,
    /// True when `total` came from the connector floor
    pub floor_applied: bool,
}

impl ScoreResult {
    /// Two or more regions scored with one placement
    pub fn is_multi_combo(&self) -> bool {
        self.per_region.len() >= 2
    }
}

/// Score `tile` at `pos` without touching `board`
pub fn score_placement(
    board: &Board,
    tile: &Arc<Tile>,
    pos: TilePos,
    rule: &impl RegionScoring,
) -> Result<ScoreResult, BoardError> {
    place_and_score(board, Arc::clone(tile), pos, rule).map(|(_, score)| score)
}

/// Insert `tile` at `pos` and score it, returning the new board alongside
/// the result. The input board is left as it was.
///
/// Only checks that the slot is free; adjacency is the caller's concern.
pub fn place_and_score(
    board: &Board,
    tile: Arc<Tile>,
    pos: TilePos,
    rule: &impl RegionScoring,
) -> Result<(Board, ScoreResult), BoardError> {
    let working = board.with_tile(pos, Arc::clone(&tile))?;
    let score = score_on(&working, &tile, pos, rule);
    Ok((working, score))
}

fn score_on(board: &Board, tile: &Tile, pos: TilePos, rule: &impl RegionScoring) -> ScoreResult {
    let mut result = ScoreResult::default();
    let mut scored: HashSet<CellPos> = HashSet::new();

    for (cells, category, _) in tile.goods() {
        for index in cells.iter() {
            let start = pos.cell(index);
            if scored.contains(&start) {
                continue;
            }

            let region = find_region(board, start, category);
            scored.extend(region.matching.iter().copied());

            let reaches_out = region.matching.iter().any(|c| c.tile_pos() != Some(pos));
            if !reaches_out {
                continue;
            }
            let magnitude = rule.magnitude(&region);
            if magnitude == 0 {
                continue;
            }
            result.total += magnitude;
            result.per_region.push(RegionScore {
                category,
                magnitude,
                cells: region.size(),
                tiles: region.tiles().len(),
            });
        }
    }

    if result.total == 0 && touches_connector(board, pos) {
        result.total = rule.connector_floor();
        result.floor_applied = result.total > 0;
    }

    trace!(
        %pos,
        total = result.total,
        regions = result.per_region.len(),
        floor = result.floor_applied,
        "placement scored"
    );
    result
}

/// Whether any cell of the slot borders a connector cell in another slot
fn touches_connector(board: &Board, pos: TilePos) -> bool {
    pos.cells().iter().any(|cell| {
        cell.neighbors().iter().any(|n| {
            n.tile_pos() != Some(pos) && board.category_at(*n) == CellContent::Connector
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{Block, CellSet, ItemId, TileId};
    use proptest::prelude::*;

    const PLUSH: Category = Category(0);
    const DOLLS: Category = Category(1);
    const VEHICLES: Category = Category(2);

    fn board_with_starter() -> Board {
        Board::with_starter(TilePos::at(1, 1), Tile::starter(TileId(0)))
    }

    fn full(id: u32, category: Category) -> Arc<Tile> {
        Arc::new(Tile::full(TileId(id), category, ItemId(0)))
    }

    fn place(board: &Board, pos: TilePos, tile: Arc<Tile>) -> Board {
        board.with_tile(pos, tile).unwrap()
    }

    #[test]
    fn test_no_matching_neighbor_scores_zero() {
        let board = place(&board_with_starter(), TilePos::at(0, 1), full(1, PLUSH));
        let result =
            score_placement(&board, &full(2, VEHICLES), TilePos::at(0, 0), &ScoringRule::CellCount)
                .unwrap();

        assert_eq!(result.total, 0);
        assert!(result.per_region.is_empty());
        assert!(!result.floor_applied);
    }

    #[test]
    fn test_adjacent_same_category_scores_region_size() {
        let board = place(&board_with_starter(), TilePos::at(0, 1), full(1, PLUSH));
        let result =
            score_placement(&board, &full(2, PLUSH), TilePos::at(0, 0), &ScoringRule::CellCount)
                .unwrap();

        assert_eq!(result.total, 8);
        assert_eq!(
            result.per_region,
            vec![RegionScore {
                category: PLUSH,
                magnitude: 8,
                cells: 8,
                tiles: 2,
            }]
        );
    }

    #[test]
    fn test_adjacent_same_category_under_tile_count() {
        let board = place(&board_with_starter(), TilePos::at(0, 1), full(1, PLUSH));
        let result =
            score_placement(&board, &full(2, PLUSH), TilePos::at(0, 0), &ScoringRule::tile_count())
                .unwrap();

        assert_eq!(result.total, 2 * DEFAULT_TILE_MULTIPLIER);
    }

    #[test]
    fn test_connector_only_adjacency() {
        let board = board_with_starter();
        let dolls = full(1, DOLLS);

        let cells = score_placement(&board, &dolls, TilePos::at(1, 0), &ScoringRule::CellCount)
            .unwrap();
        assert_eq!(cells.total, 1);
        assert!(cells.floor_applied);

        let tiles = score_placement(&board, &dolls, TilePos::at(1, 0), &ScoringRule::tile_count())
            .unwrap();
        assert_eq!(tiles.total, 0);
        assert!(!tiles.floor_applied);
    }

    #[test]
    fn test_connector_joins_regions_on_both_sides() {
        let board = place(&board_with_starter(), TilePos::at(1, 0), full(1, PLUSH));
        let result =
            score_placement(&board, &full(2, PLUSH), TilePos::at(1, 2), &ScoringRule::CellCount)
                .unwrap();

        assert_eq!(result.total, 8);
        assert!(!result.floor_applied);
    }

    #[test]
    fn test_region_spanning_two_blocks_counted_once() {
        let board = place(&board_with_starter(), TilePos::at(0, 1), full(1, PLUSH));
        // Two plush halves with different items: both resolve to one region
        let split = Arc::new(
            Tile::new(
                TileId(2),
                vec![
                    Block::goods(CellSet::LEFT, PLUSH, ItemId(1)),
                    Block::goods(CellSet::RIGHT, PLUSH, ItemId(2)),
                ],
            )
            .unwrap(),
        );
        let result =
            score_placement(&board, &split, TilePos::at(0, 0), &ScoringRule::CellCount).unwrap();

        assert_eq!(result.total, 8);
        assert_eq!(result.per_region.len(), 1);
    }

    #[test]
    fn test_multi_combo() {
        // Plush on the left, vehicles on the right; new tile bridges both
        let board = place(&board_with_starter(), TilePos::at(0, 0), full(1, PLUSH));
        let board = place(&board, TilePos::at(0, 1), Arc::new(Tile::starter(TileId(9))));
        let board = place(&board, TilePos::at(0, 3), full(2, VEHICLES));
        let bridge = Arc::new(
            Tile::new(
                TileId(3),
                vec![
                    Block::goods(CellSet::LEFT, PLUSH, ItemId(0)),
                    Block::goods(CellSet::RIGHT, VEHICLES, ItemId(0)),
                ],
            )
            .unwrap(),
        );
        let result =
            score_placement(&board, &bridge, TilePos::at(0, 2), &ScoringRule::CellCount).unwrap();

        // Plush reaches (0,0) through the connector tile at (0,1)
        assert!(result.is_multi_combo());
        assert_eq!(result.total, 6 + 6);
    }

    #[test]
    fn test_new_tile_alone_does_not_score() {
        // Two plush halves inside the new tile, touching only other colours
        let board = place(&board_with_starter(), TilePos::at(0, 1), full(1, DOLLS));
        let split = Arc::new(
            Tile::new(
                TileId(2),
                vec![
                    Block::goods(CellSet::TOP, PLUSH, ItemId(0)),
                    Block::goods(CellSet::BOTTOM, PLUSH, ItemId(1)),
                ],
            )
            .unwrap(),
        );
        let result =
            score_placement(&board, &split, TilePos::at(0, 0), &ScoringRule::CellCount).unwrap();
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_preview_leaves_board_untouched() {
        let board = board_with_starter();
        let before = board.clone();
        let _ = score_placement(&board, &full(1, PLUSH), TilePos::at(0, 1), &ScoringRule::CellCount)
            .unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_occupied_slot_is_an_error() {
        let board = board_with_starter();
        let result = score_placement(&board, &full(1, PLUSH), TilePos::at(1, 1), &ScoringRule::CellCount);
        assert_eq!(result, Err(BoardError::SlotOccupied(TilePos::at(1, 1))));
    }

    #[test]
    fn test_custom_strategy() {
        struct Flat;
        impl RegionScoring for Flat {
            fn magnitude(&self, _: &Region) -> u32 {
                3
            }
        }

        let board = place(&board_with_starter(), TilePos::at(0, 1), full(1, PLUSH));
        let result = score_placement(&board, &full(2, PLUSH), TilePos::at(0, 0), &Flat).unwrap();
        assert_eq!(result.total, 3);

        let lonely = score_placement(&board_with_starter(), &full(3, DOLLS), TilePos::at(1, 0), &Flat)
            .unwrap();
        assert_eq!(lonely.total, 0);
    }

    #[test]
    fn test_scoring_rule_json() {
        let json = serde_json::to_string(&ScoringRule::tile_count()).unwrap();
        assert_eq!(json, r#"{"TileCount":{"multiplier":2}}"#);
        let rule: ScoringRule = serde_json::from_str(r#""CellCount""#).unwrap();
        assert_eq!(rule, ScoringRule::CellCount);
    }

    proptest! {
        /// Growing a scored plush region by another plush tile never shrinks
        /// the payout for that region.
        #[test]
        fn prop_region_score_monotonic(extra in 0usize..=2, tile_rule in any::<bool>()) {
            let rule = if tile_rule { ScoringRule::tile_count() } else { ScoringRule::CellCount };
            // A row of plush tiles along the top, grown from the left
            let row = [TilePos::at(0, 0), TilePos::at(0, 1), TilePos::at(0, 2), TilePos::at(0, 3)];
            let mut board = Board::with_starter(TilePos::at(1, 3), Tile::starter(TileId(0)));
            board = place(&board, TilePos::at(0, 3), full(1, PLUSH));
            for (i, pos) in row[..extra].iter().enumerate() {
                board = place(&board, *pos, full(10 + i as u32, PLUSH));
            }

            let target = TilePos::at(0, 2);
            let before = score_placement(&board, &full(50, PLUSH), target, &rule).unwrap();

            // Add one more plush tile to the existing region, then score again
            let grown = place(&board, TilePos::at(1, 2), full(51, PLUSH));
            let after = score_placement(&grown, &full(50, PLUSH), target, &rule).unwrap();
            prop_assert!(after.total >= before.total);
        }

        /// However a plush tile is split into plush blocks, the region it
        /// joins is scored once, with every matching cell counted once.
        #[test]
        fn prop_no_double_counting(
            layout in 0usize..4,
            half in 0usize..4,
            items in prop::array::uniform4(0u8..4),
            below in any::<bool>(),
        ) {
            let main = CellSet::HALVES[half];
            let cells: Vec<CellSet> = match layout {
                0 => vec![CellSet::FULL],
                1 => vec![main, main.complement()],
                2 => std::iter::once(main)
                    .chain(main.complement().iter().map(CellSet::single))
                    .collect(),
                _ => (0..4).map(CellSet::single).collect(),
            };
            let blocks = cells
                .into_iter()
                .zip(items)
                .map(|(cells, item)| Block::goods(cells, PLUSH, ItemId(item)))
                .collect();
            let split = Arc::new(Tile::new(TileId(2), blocks).unwrap());

            let mut board = place(&board_with_starter(), TilePos::at(0, 1), full(1, PLUSH));
            if below {
                board = place(&board, TilePos::at(1, 0), full(3, PLUSH));
            }
            let result =
                score_placement(&board, &split, TilePos::at(0, 0), &ScoringRule::CellCount).unwrap();

            let tiles_in_region = if below { 3 } else { 2 };
            prop_assert_eq!(result.per_region.len(), 1);
            prop_assert_eq!(result.per_region[0].cells, 4 * tiles_in_region);
            prop_assert_eq!(result.per_region[0].tiles, tiles_in_region);
            prop_assert_eq!(result.total, 4 * tiles_in_region as u32);
        }
    }
}
