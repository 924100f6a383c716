//! Placement validity.
//!
//! A slot accepts a new tile when it is empty and shares a side with an
//! occupied slot. The board keeps the set of such slots up to date on every
//! insertion (its frontier mask), so queries here are constant time.

use crate::board::Board;
use crate::grid::{TilePos, SLOT_COUNT};
use std::collections::BTreeSet;

/// Mask with every slot bit set
const ALL_SLOTS: u16 = u16::MAX >> (16 - SLOT_COUNT);

/// Bitmask of legal slots.
///
/// A board with nothing on it degrades to "every slot"; normal play always
/// has a starter tile down before the first query.
pub fn valid_mask(board: &Board) -> u16 {
    if board.is_empty() {
        ALL_SLOTS
    } else {
        board.frontier_mask()
    }
}

/// All slots where a tile may be placed
pub fn valid_positions(board: &Board) -> BTreeSet<TilePos> {
    let mask = valid_mask(board);
    TilePos::all().filter(|pos| mask & pos.bit() != 0).collect()
}

/// Whether a single slot accepts a tile
pub fn is_valid_placement(board: &Board, pos: TilePos) -> bool {
    valid_mask(board) & pos.bit() != 0
}

/// Reference check straight from the rule, without the cached frontier
#[cfg(test)]
fn is_valid_by_scan(board: &Board, pos: TilePos) -> bool {
    if board.is_empty() {
        return true;
    }
    !board.is_occupied(pos) && pos.neighbors().any(|n| board.is_occupied(n))
}
