//! Rule-set configuration.
//!
//! Everything that differs between rule variants is data here rather than
//! code: the goods table (categories and their items), the coin/token
//! exchange threshold, award values, market and deck sizes, where the starter
//! tile goes, and which region scoring convention is in force.

use crate::grid::TilePos;
use crate::scoring::ScoringRule;
use crate::tile::{Category, Tile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coins that exchange for one token
const DEFAULT_COIN_THRESHOLD: u32 = 10;

/// Value of a diversity or majority award
const DEFAULT_AWARD_VALUE: u32 = 5;

const DEFAULT_MARKET_SIZE: usize = 4;

const DEFAULT_DECK_SIZE: usize = 64;

const DEFAULT_MAX_PLAYERS: usize = 4;

/// One goods category and the distinct items it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub items: Vec<String>,
}

impl CategoryDef {
    pub fn new(name: &str, items: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            items: items.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Problems with a rule set
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("rule set defines no categories")]
    NoCategories,

    #[error("rule set defines {0} categories, at most 255 are supported")]
    TooManyCategories(usize),

    #[error("category {0:?} has no items (or more than 255)")]
    BadItemCount(String),

    #[error("coin threshold must be positive")]
    ZeroThreshold,

    #[error("market size must be positive")]
    ZeroMarket,

    #[error("tile-count multiplier must be positive")]
    ZeroMultiplier,

    #[error("invalid rule set JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The complete set of game rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Goods table, indexed by `Category`
    pub categories: Vec<CategoryDef>,
    /// Coins exchanged for one token
    pub coin_threshold: u32,
    pub diversity_award_value: u32,
    pub majority_award_value: u32,
    /// Face-up tiles in the market
    pub market_size: usize,
    /// Tiles generated for a random supply
    pub deck_size: usize,
    pub max_players: usize,
    /// Where each board's starter tile goes
    pub starter_pos: TilePos,
    pub scoring: ScoringRule,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::sweet_shop()
    }
}

impl RuleSet {
    /// The standard rules: four sweet categories with four items each
    pub fn sweet_shop() -> Self {
        Self::with_categories(vec![
            CategoryDef::new("bakery", &["waffle", "croissant", "donut", "pancake"]),
            CategoryDef::new("ice_cream", &["shaved_ice", "ice_cream", "soft_serve", "dango"]),
            CategoryDef::new("pies", &["cupcake", "pie", "cake", "birthday_cake"]),
            CategoryDef::new("candy", &["lollipop", "candy", "chocolate", "popcorn"]),
        ])
    }

    /// The toy variant: four categories with five items each
    pub fn toy_shop() -> Self {
        Self::with_categories(vec![
            CategoryDef::new("plush", &["puppy", "bunny", "cat", "unicorn", "bear"]),
            CategoryDef::new("dolls", &["robot", "doll", "princess", "soldier", "clown"]),
            CategoryDef::new("vehicles", &["car", "train", "plane", "boat", "rocket"]),
            CategoryDef::new("sports", &["ball", "racket", "skates", "kite", "yoyo"]),
        ])
    }

    /// Default numbers around a custom goods table
    pub fn with_categories(categories: Vec<CategoryDef>) -> Self {
        Self {
            categories,
            coin_threshold: DEFAULT_COIN_THRESHOLD,
            diversity_award_value: DEFAULT_AWARD_VALUE,
            majority_award_value: DEFAULT_AWARD_VALUE,
            market_size: DEFAULT_MARKET_SIZE,
            deck_size: DEFAULT_DECK_SIZE,
            max_players: DEFAULT_MAX_PLAYERS,
            starter_pos: TilePos::at(1, 1),
            scoring: ScoringRule::default(),
        }
    }

    /// Parse and validate a rule set from JSON. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, RuleSetError> {
        let rules: RuleSet = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RuleSetError> {
        if self.categories.is_empty() {
            return Err(RuleSetError::NoCategories);
        }
        if self.categories.len() > u8::MAX as usize {
            return Err(RuleSetError::TooManyCategories(self.categories.len()));
        }
        if let Some(def) = self
            .categories
            .iter()
            .find(|def| def.items.is_empty() || def.items.len() > u8::MAX as usize)
        {
            return Err(RuleSetError::BadItemCount(def.name.clone()));
        }
        if self.coin_threshold == 0 {
            return Err(RuleSetError::ZeroThreshold);
        }
        if self.market_size == 0 {
            return Err(RuleSetError::ZeroMarket);
        }
        if let ScoringRule::TileCount { multiplier: 0 } = self.scoring {
            return Err(RuleSetError::ZeroMultiplier);
        }
        Ok(())
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Every category, in table order
    pub fn categories(&self) -> impl Iterator<Item = Category> {
        (0..self.categories.len()).map(|i| Category(i as u8))
    }

    pub fn item_count(&self, category: Category) -> usize {
        self.categories
            .get(category.index())
            .map_or(0, |def| def.items.len())
    }

    /// Distinct items needed for a diversity award in this category
    pub fn diversity_target(&self, category: Category) -> usize {
        self.item_count(category)
    }

    pub fn category_name(&self, category: Category) -> &str {
        self.categories
            .get(category.index())
            .map_or("unknown", |def| def.name.as_str())
    }

    /// Whether every goods block of a tile names a known category and item
    pub fn accepts_tile(&self, tile: &Tile) -> bool {
        tile.goods()
            .all(|(_, category, item)| item.index() < self.item_count(category))
    }
}
