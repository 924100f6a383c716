//! Connected regions on the cell grid.
//!
//! A region is everything reachable from a start cell by stepping between
//! orthogonally adjacent cells that either hold the target category or hold a
//! connector. Connector cells are walked through but kept apart from the
//! matching cells, so they join pools of the same colour without counting as
//! that colour.

use crate::board::{Board, CellContent};
use crate::grid::{CellPos, TilePos};
use crate::tile::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use tracing::trace;

/// The result of one flood fill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Cells of the target category
    pub matching: BTreeSet<CellPos>,
    /// Connector cells passed through
    pub connectors: BTreeSet<CellPos>,
}

impl Region {
    pub fn is_empty(&self) -> bool {
        self.matching.is_empty()
    }

    /// Number of matching cells
    pub fn size(&self) -> usize {
        self.matching.len()
    }

    /// Slots that contribute at least one matching cell
    pub fn tiles(&self) -> BTreeSet<TilePos> {
        self.matching.iter().filter_map(|c| c.tile_pos()).collect()
    }
}

/// Flood-fill the region of `target` reachable from `start`.
///
/// If `start` itself is neither `target` nor a connector the region is empty.
pub fn find_region(board: &Board, start: CellPos, target: Category) -> Region {
    let mut region = Region::default();
    if !enter(board, start, target, &mut region) {
        return region;
    }

    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        for next in cell.neighbors() {
            if region.matching.contains(&next) || region.connectors.contains(&next) {
                continue;
            }
            if enter(board, next, target, &mut region) {
                queue.push_back(next);
            }
        }
    }

    trace!(
        ?start,
        ?target,
        matching = region.matching.len(),
        connectors = region.connectors.len(),
        "region resolved"
    );
    region
}

/// Record `cell` in the region if it can be entered
fn enter(board: &Board, cell: CellPos, target: Category, region: &mut Region) -> bool {
    match board.category_at(cell) {
        CellContent::Goods(category) if category == target => region.matching.insert(cell),
        CellContent::Connector => region.connectors.insert(cell),
        _ => false,
    }
}
