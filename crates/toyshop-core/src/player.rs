//! Player state and currency.
//!
//! This module contains:
//! - `Purse`, coins plus the token denomination they exchange into
//! - `Award` and `AwardKind`, the diversity and majority bonuses
//! - `Player`, tying a purse and awards to one board

use crate::board::Board;
use crate::tile::{Category, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Index of a player in `GameState::players`
pub type PlayerId = u8;

/// A player's money.
///
/// Coins are exchanged for tokens whenever they reach the rule set's
/// threshold, so `coins` always stays below it after a deposit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purse {
    pub coins: u32,
    pub tokens: u32,
}

impl Purse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add coins, then exchange every full `threshold` of coins for a token.
    /// Returns the number of tokens gained.
    pub fn deposit(&mut self, amount: u32, threshold: u32) -> u32 {
        self.coins += amount;
        if threshold == 0 {
            return 0;
        }
        let gained = self.coins / threshold;
        self.tokens += gained;
        self.coins %= threshold;
        gained
    }

    /// Total worth in coins
    pub fn value(&self, threshold: u32) -> u32 {
        self.coins + self.tokens * threshold
    }
}

/// Bonus types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AwardKind {
    /// Every distinct item of a category on one board
    Diversity,
    /// Largest single-item holding of a category at game end
    Majority,
}

impl fmt::Display for AwardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AwardKind::Diversity => write!(f, "diversity"),
            AwardKind::Majority => write!(f, "majority"),
        }
    }
}

/// A granted bonus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Award {
    pub kind: AwardKind,
    pub category: Category,
    pub value: u32,
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player ID (index into the player list)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    pub purse: Purse,
    /// Awards in the order they were granted; never removed
    pub awards: Vec<Award>,
    pub board: Board,
}

impl Player {
    /// Create a new player around a board that already holds its starter
    pub fn new(id: PlayerId, name: String, board: Board) -> Self {
        Self {
            id,
            name,
            purse: Purse::new(),
            awards: Vec::new(),
            board,
        }
    }

    pub fn has_award(&self, kind: AwardKind, category: Category) -> bool {
        self.awards
            .iter()
            .any(|a| a.kind == kind && a.category == category)
    }

    /// Sum of award values
    pub fn award_total(&self) -> u32 {
        self.awards.iter().map(|a| a.value).sum()
    }

    /// Coins, tokens at face value, and awards
    pub fn final_score(&self, threshold: u32) -> u32 {
        self.purse.value(threshold) + self.award_total()
    }

    /// Distinct items of a category on this player's board
    pub fn items_collected(&self, category: Category) -> BTreeSet<ItemId> {
        self.board
            .tiles()
            .flat_map(|(_, tile)| tile.goods())
            .filter(|&(_, c, _)| c == category)
            .map(|(_, _, item)| item)
            .collect()
    }

    /// Cells covered by each item of a category on this player's board
    pub fn item_cells(&self, category: Category) -> BTreeMap<ItemId, u32> {
        let mut counts = BTreeMap::new();
        for (cells, c, item) in self.board.tiles().flat_map(|(_, tile)| tile.goods()) {
            if c == category {
                *counts.entry(item).or_insert(0) += cells.len();
            }
        }
        counts
    }
}
