//! Automated players.
//!
//! Two strategies:
//! - Random: any legal pick, any legal slot
//! - Greedy: the market tile and slot with the highest immediate score

use crate::actions::GameAction;
use crate::game::{GamePhase, GameState};
use crate::grid::TilePos;
use crate::player::PlayerId;
use crate::scoring::score_placement;
use crate::validation::valid_positions;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// How a bot decides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotStrategy {
    Random,
    Greedy,
}

/// A bot player that can decide on actions
pub struct Bot {
    pub player_id: PlayerId,
    pub strategy: BotStrategy,
    rng: StdRng,
}

impl Bot {
    pub fn new(player_id: PlayerId, strategy: BotStrategy) -> Self {
        Self {
            player_id,
            strategy,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(player_id: PlayerId, strategy: BotStrategy, seed: u64) -> Self {
        Self {
            player_id,
            strategy,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Choose an action from the valid actions
    pub fn choose_action(&mut self, game: &GameState) -> Option<GameAction> {
        let valid_actions = game.valid_actions(self.player_id);
        if valid_actions.is_empty() {
            return None;
        }

        match self.strategy {
            BotStrategy::Random => self.choose_random(&valid_actions),
            BotStrategy::Greedy => self.choose_greedy(game, &valid_actions),
        }
    }

    /// Random: commit to a slot once a tile is in hand, otherwise anything
    fn choose_random(&mut self, actions: &[GameAction]) -> Option<GameAction> {
        let placements: Vec<GameAction> = actions
            .iter()
            .copied()
            .filter(|a| matches!(a, GameAction::PlaceTile(_)))
            .collect();
        if placements.is_empty() {
            actions.choose(&mut self.rng).copied()
        } else {
            placements.choose(&mut self.rng).copied()
        }
    }

    /// Greedy: best immediate score; earlier market slots win ties
    fn choose_greedy(&mut self, game: &GameState, actions: &[GameAction]) -> Option<GameAction> {
        match game.phase {
            GamePhase::PickTile => best_market_tile(game, self.player_id)
                .map(|(index, _)| GameAction::PickTile(index))
                .or_else(|| actions.first().copied()),
            GamePhase::PlaceTile { market_index } => {
                // Switch if another tile beats the one in hand
                if let Some((best, _)) = best_market_tile(game, self.player_id) {
                    if best != market_index {
                        return Some(GameAction::PickTile(best));
                    }
                }
                best_slot(game)
                    .map(|(pos, _)| GameAction::PlaceTile(pos))
                    .or_else(|| actions.first().copied())
            }
            _ => actions.first().copied(),
        }
    }
}

/// The market index whose best placement scores highest
fn best_market_tile(game: &GameState, player: PlayerId) -> Option<(usize, u32)> {
    let board = &game.get_player(player)?.board;
    let slots = valid_positions(board);

    let mut best: Option<(usize, u32)> = None;
    for (index, tile) in game.market.iter().enumerate() {
        let top = slots
            .iter()
            .filter_map(|&pos| score_placement(board, tile, pos, &game.rules.scoring).ok())
            .map(|score| score.total)
            .max()
            .unwrap_or(0);
        if best.map_or(true, |(_, score)| top > score) {
            best = Some((index, top));
        }
    }
    best
}

/// The highest-scoring slot for the selected tile
fn best_slot(game: &GameState) -> Option<(TilePos, u32)> {
    let board = &game.get_player(game.current_player)?.board;

    let mut best: Option<(TilePos, u32)> = None;
    for pos in valid_positions(board) {
        let Ok(score) = game.preview(pos) else {
            continue;
        };
        if best.map_or(true, |(_, top)| score.total > top) {
            best = Some((pos, score.total));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::advance_phase;
    use crate::rules::RuleSet;
    use crate::supply::Supply;
    use crate::tile::{Category, ItemId, Tile, TileId};

    fn names() -> Vec<String> {
        vec!["Bot".into(), "Human".into()]
    }

    fn seeded_game(seed: u64) -> GameState {
        let mut rng = StdRng::seed_from_u64(seed);
        GameState::with_rng(names(), RuleSet::sweet_shop(), &mut rng).unwrap()
    }

    #[test]
    fn test_bot_creation() {
        let bot = Bot::new(0, BotStrategy::Random);
        assert_eq!(bot.player_id, 0);
        assert_eq!(bot.strategy, BotStrategy::Random);
    }

    #[test]
    fn test_random_bot_chooses_valid_action() {
        let game = seeded_game(1);
        let mut bot = Bot::with_seed(game.current_player, BotStrategy::Random, 5);

        let action = bot.choose_action(&game).unwrap();
        assert!(game.valid_actions(0).contains(&action));
    }

    #[test]
    fn test_bot_idle_when_not_its_turn() {
        let game = seeded_game(2);
        let mut bot = Bot::with_seed(1, BotStrategy::Greedy, 0);
        assert_eq!(bot.choose_action(&game), None);
    }

    #[test]
    fn test_random_bot_places_after_picking() {
        let game = seeded_game(3);
        let game = advance_phase(&game, GameAction::PickTile(0));
        let mut bot = Bot::with_seed(0, BotStrategy::Random, 9);
        for _ in 0..20 {
            assert!(matches!(bot.choose_action(&game), Some(GameAction::PlaceTile(_))));
        }
    }

    #[test]
    fn test_greedy_prefers_joining_a_region() {
        // Market: blue, red, blue, blue. Red joins the red tile already down.
        let deck = vec![
            Tile::full(TileId(1), Category(0), ItemId(0)),
            Tile::full(TileId(2), Category(1), ItemId(0)),
            Tile::full(TileId(3), Category(0), ItemId(1)),
            Tile::full(TileId(4), Category(1), ItemId(1)),
            Tile::full(TileId(5), Category(1), ItemId(2)),
        ];
        let supply = Supply::from_tiles(vec![Tile::starter(TileId(0))], deck);
        let game = GameState::with_supply(vec!["Bot".into()], RuleSet::sweet_shop(), supply).unwrap();
        let game = advance_phase(&game, GameAction::PickTile(0));
        let game = advance_phase(&game, GameAction::PlaceTile(TilePos::at(0, 1)));
        let game = advance_phase(&game, GameAction::Acknowledge);

        let mut bot = Bot::with_seed(0, BotStrategy::Greedy, 0);
        let pick = bot.choose_action(&game);
        assert_eq!(pick, Some(GameAction::PickTile(1)));

        let game = advance_phase(&game, GameAction::PickTile(1));
        let place = bot.choose_action(&game);
        let Some(GameAction::PlaceTile(pos)) = place else {
            panic!("expected a placement, got {:?}", place);
        };
        assert_eq!(game.preview(pos).unwrap().total, 8);
    }

    #[test]
    fn test_bots_finish_a_game() {
        let mut game = seeded_game(4);
        let mut bots = [
            Bot::with_seed(0, BotStrategy::Greedy, 10),
            Bot::with_seed(1, BotStrategy::Random, 11),
        ];

        let mut steps = 0;
        while !game.is_finished() {
            let current = game.current_player as usize;
            let action = bots[current].choose_action(&game).unwrap();
            game.apply(game.current_player, action).unwrap();
            steps += 1;
            assert!(steps < 1000, "game did not finish");
        }
        assert!(game.winners().is_some());
    }
}
