//! Game actions that players can take.
//!
//! This module defines the three turn actions and the events that result
//! from them.

use crate::grid::{OutOfBounds, TilePos};
use crate::player::{Award, PlayerId};
use crate::scoring::ScoreResult;
use crate::tile::TileId;
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Select the market tile at this index (or switch to it)
    PickTile(usize),
    /// Place the selected tile in this slot
    PlaceTile(TilePos),
    /// Dismiss the score display and end the turn
    Acknowledge,
}

impl GameAction {
    /// A placement from raw coordinates
    pub fn place_at(row: i32, col: i32) -> Result<Self, OutOfBounds> {
        TilePos::new(row, col).map(GameAction::PlaceTile)
    }
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A market tile was selected
    TilePicked {
        player: PlayerId,
        market_index: usize,
        tile: TileId,
    },

    /// A tile went onto a board and was scored
    TilePlaced {
        player: PlayerId,
        tile: TileId,
        pos: TilePos,
        score: ScoreResult,
    },

    /// Coins were exchanged for tokens
    CoinsExchanged { player: PlayerId, tokens: u32 },

    /// An award was added to a player
    AwardGranted { player: PlayerId, award: Award },

    /// The turn passed to the next player
    TurnEnded { player: PlayerId, next: PlayerId },

    /// The game is over
    GameEnded {
        /// (player, final score) in player order
        final_scores: Vec<(PlayerId, u32)>,
        winners: Vec<PlayerId>,
    },
}
