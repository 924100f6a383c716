//! Tile supply generation.
//!
//! Produces the shuffled draw deck and one starter tile per player. Layouts
//! are drawn by weight; each block gets a random category and item from the
//! rule set's goods table. Tile ids are handed out sequentially.

use crate::rules::RuleSet;
use crate::tile::{Block, CellSet, Category, ItemId, Tile, TileError, TileId, TileLayout};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Relative frequency of each layout in a random deck
pub const LAYOUT_WEIGHTS: [(TileLayout, u32); 4] = [
    (TileLayout::Full, 8),
    (TileLayout::TwoHalves, 20),
    (TileLayout::HalfAndTwoQuarters, 20),
    (TileLayout::FourQuarters, 16),
];

/// The two ways to cut a tile into halves
const HALF_SPLITS: [(CellSet, CellSet); 2] = [
    (CellSet::TOP, CellSet::BOTTOM),
    (CellSet::LEFT, CellSet::RIGHT),
];

/// A half and the two cells it leaves over
const HALF_QUARTER_SPLITS: [(CellSet, u8, u8); 4] = [
    (CellSet::TOP, 2, 3),
    (CellSet::BOTTOM, 0, 1),
    (CellSet::LEFT, 1, 3),
    (CellSet::RIGHT, 0, 2),
];

/// Everything a game draws from
#[derive(Debug, Clone)]
pub struct Supply {
    /// One per player
    pub starters: Vec<Tile>,
    /// Draw order: front first
    pub deck: VecDeque<Arc<Tile>>,
}

impl Supply {
    /// A random supply from a caller-provided RNG (for deterministic games)
    pub fn standard_with_rng<R: Rng>(
        rules: &RuleSet,
        player_count: usize,
        rng: &mut R,
    ) -> Result<Self, TileError> {
        let mut factory = TileFactory::new();
        let starters = (0..player_count).map(|_| factory.starter()).collect();

        let mut deck = (0..rules.deck_size)
            .map(|_| factory.random_tile(rules, rng).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;
        deck.shuffle(rng);

        debug!(players = player_count, deck = deck.len(), "supply generated");
        Ok(Self {
            starters,
            deck: deck.into(),
        })
    }

    /// A scripted supply; `deck` is in draw order
    pub fn from_tiles(starters: Vec<Tile>, deck: Vec<Tile>) -> Self {
        Self {
            starters,
            deck: deck.into_iter().map(Arc::new).collect(),
        }
    }
}

/// Hands out tiles with sequential ids
#[derive(Debug, Clone)]
pub struct TileFactory {
    next_id: u32,
}

impl Default for TileFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TileFactory {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    fn take_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        id
    }

    /// A full connector tile
    pub fn starter(&mut self) -> Tile {
        Tile::starter(self.take_id())
    }

    /// A tile with a weighted random layout
    pub fn random_tile<R: Rng>(&mut self, rules: &RuleSet, rng: &mut R) -> Result<Tile, TileError> {
        let layout = LAYOUT_WEIGHTS
            .choose_weighted(rng, |&(_, weight)| weight)
            .map_or(TileLayout::Full, |&(layout, _)| layout);
        self.tile_with_layout(layout, rules, rng)
    }

    /// A random tile of a given layout
    pub fn tile_with_layout<R: Rng>(
        &mut self,
        layout: TileLayout,
        rules: &RuleSet,
        rng: &mut R,
    ) -> Result<Tile, TileError> {
        let blocks = match layout {
            TileLayout::Full => vec![random_block(CellSet::FULL, rules, rng)],
            TileLayout::TwoHalves => {
                let &(first, second) = HALF_SPLITS.choose(rng).unwrap_or(&HALF_SPLITS[0]);
                let a = random_category(rules, rng);
                // Halves of one colour would just be a full tile
                let b = random_category_except(rules, a, rng);
                vec![
                    Block::goods(first, a, random_item(rules, a, rng)),
                    Block::goods(second, b, random_item(rules, b, rng)),
                ]
            }
            TileLayout::HalfAndTwoQuarters => {
                let &(half, q1, q2) = HALF_QUARTER_SPLITS
                    .choose(rng)
                    .unwrap_or(&HALF_QUARTER_SPLITS[0]);
                vec![
                    random_block(half, rules, rng),
                    random_block(CellSet::single(q1), rules, rng),
                    random_block(CellSet::single(q2), rules, rng),
                ]
            }
            TileLayout::FourQuarters => (0..4)
                .map(|i| random_block(CellSet::single(i), rules, rng))
                .collect(),
        };
        Tile::new(self.take_id(), blocks)
    }
}

fn random_category<R: Rng>(rules: &RuleSet, rng: &mut R) -> Category {
    let count = rules.category_count().max(1);
    Category(rng.gen_range(0..count) as u8)
}

/// A category other than `not`, if the table has more than one
fn random_category_except<R: Rng>(rules: &RuleSet, not: Category, rng: &mut R) -> Category {
    let count = rules.category_count();
    if count < 2 {
        return not;
    }
    let pick = rng.gen_range(0..count - 1);
    let index = if pick >= not.index() { pick + 1 } else { pick };
    Category(index as u8)
}

fn random_item<R: Rng>(rules: &RuleSet, category: Category, rng: &mut R) -> ItemId {
    let count = rules.item_count(category).max(1);
    ItemId(rng.gen_range(0..count) as u8)
}

fn random_block<R: Rng>(cells: CellSet, rules: &RuleSet, rng: &mut R) -> Block {
    let category = random_category(rules, rng);
    Block::goods(cells, category, random_item(rules, category, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_standard_supply_sizes() {
        let rules = RuleSet::sweet_shop();
        let mut rng = StdRng::seed_from_u64(7);
        let supply = Supply::standard_with_rng(&rules, 3, &mut rng).unwrap();

        assert_eq!(supply.starters.len(), 3);
        assert!(supply.starters.iter().all(Tile::is_starter));
        assert_eq!(supply.deck.len(), 64);
    }

    #[test]
    fn test_ids_are_unique() {
        let rules = RuleSet::sweet_shop();
        let mut rng = StdRng::seed_from_u64(11);
        let supply = Supply::standard_with_rng(&rules, 2, &mut rng).unwrap();

        let ids: HashSet<TileId> = supply
            .starters
            .iter()
            .map(|t| t.id)
            .chain(supply.deck.iter().map(|t| t.id))
            .collect();
        assert_eq!(ids.len(), 66);
    }

    #[test]
    fn test_generated_tiles_fit_rules() {
        let rules = RuleSet::toy_shop();
        let mut rng = StdRng::seed_from_u64(3);
        let supply = Supply::standard_with_rng(&rules, 1, &mut rng).unwrap();

        for tile in &supply.deck {
            assert!(rules.accepts_tile(tile));
            assert!(!tile.is_starter());
        }
    }

    #[test]
    fn test_two_halves_differ() {
        let rules = RuleSet::sweet_shop();
        let mut rng = StdRng::seed_from_u64(5);
        let mut factory = TileFactory::new();
        for _ in 0..50 {
            let tile = factory
                .tile_with_layout(TileLayout::TwoHalves, &rules, &mut rng)
                .unwrap();
            let categories: Vec<_> = tile.goods().map(|(_, c, _)| c).collect();
            assert_eq!(categories.len(), 2);
            assert_ne!(categories[0], categories[1]);
            assert_eq!(tile.layout(), TileLayout::TwoHalves);
        }
    }

    #[test]
    fn test_every_layout_is_generated() {
        let rules = RuleSet::sweet_shop();
        let mut rng = StdRng::seed_from_u64(99);
        let mut factory = TileFactory::new();
        let layouts: HashSet<TileLayout> = (0..200)
            .map(|_| factory.random_tile(&rules, &mut rng).unwrap().layout())
            .collect();
        assert_eq!(layouts.len(), 4);
    }

    #[test]
    fn test_same_seed_same_deck() {
        let rules = RuleSet::sweet_shop();
        let a = Supply::standard_with_rng(&rules, 2, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = Supply::standard_with_rng(&rules, 2, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.deck, b.deck);
    }

    #[test]
    fn test_single_category_table() {
        let rules = RuleSet::with_categories(vec![crate::rules::CategoryDef::new("only", &["a", "b"])]);
        let mut rng = StdRng::seed_from_u64(1);
        let tile = TileFactory::new()
            .tile_with_layout(TileLayout::TwoHalves, &rules, &mut rng)
            .unwrap();
        assert!(tile.goods().all(|(_, c, _)| c == Category(0)));
    }
}
