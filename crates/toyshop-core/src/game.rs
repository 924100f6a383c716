//! Core game state machine.
//!
//! This module contains the main `GameState` struct and the turn flow:
//! pick a market tile, place it, look at the score, then either pass the turn
//! or end the game. Transitions never mutate the state they are applied to;
//! they return a new state (boards share their tiles, so this is cheap).

use crate::actions::{GameAction, GameEvent};
use crate::awards::{diversity_awards, evaluate_majority, DiversityFlags};
use crate::board::Board;
use crate::grid::{OutOfBounds, TilePos};
use crate::player::{Award, Player, PlayerId};
use crate::rules::{RuleSet, RuleSetError};
use crate::scoring::{place_and_score, score_placement, ScoreResult};
use crate::supply::Supply;
use crate::tile::{Tile, TileError, TileId};
use crate::validation::{is_valid_placement, valid_positions};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Turn step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Choose a market tile
    PickTile,

    /// A market tile is selected and waits for a slot
    PlaceTile {
        /// Index of the selected tile in the market
        market_index: usize,
    },

    /// The placement has been scored; waiting for acknowledgement
    ScoreShown {
        score: ScoreResult,
        /// Awards granted by this placement
        awards: Vec<Award>,
    },

    /// Game is over
    Ended { winners: Vec<PlayerId> },
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("No tile at market index {0}")]
    NoSuchMarketTile(usize),

    #[error("Cannot place a tile at {0}")]
    IllegalPlacement(TilePos),

    #[error("Game is over")]
    GameOver,

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
}

impl GameError {
    /// True for ordinary rule rejections the player can recover from; false
    /// for malformed input that points at a bug in the caller
    pub fn is_rule_rejection(&self) -> bool {
        !matches!(self, GameError::OutOfBounds(_) | GameError::UnknownPlayer(_))
    }
}

/// Errors creating a game
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("A game needs at least one player")]
    NoPlayers,

    #[error("{count} players requested, at most {max} allowed")]
    TooManyPlayers { count: usize, max: usize },

    #[error("{needed} starter tiles needed, {got} supplied")]
    NotEnoughStarters { needed: usize, got: usize },

    #[error("{0} uses a category or item the rules do not define")]
    TileNotInRules(TileId),

    #[error("starter {0} is not a starter tile")]
    NotAStarter(TileId),

    #[error(transparent)]
    Rules(#[from] RuleSetError),

    #[error(transparent)]
    Tile(#[from] TileError),
}

/// Reasons a saved game cannot be loaded
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Rules(#[from] RuleSetError),

    #[error("snapshot has no players")]
    NoPlayers,

    #[error("player in seat {seat} has id {id}")]
    SeatMismatch { seat: usize, id: PlayerId },

    #[error("current player {0} is not seated")]
    UnknownCurrentPlayer(PlayerId),

    #[error("{got} diversity flags for {expected} categories")]
    DiversityFlagCount { expected: usize, got: usize },

    #[error("{0} uses a category or item the rules do not define")]
    TileNotInRules(TileId),

    #[error("selected market index {0} is out of range")]
    SelectionOutOfRange(usize),
}

/// A new state plus what happened on the way to it
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// The complete game state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GameSnapshot")]
pub struct GameState {
    pub rules: RuleSet,
    /// All players
    pub players: Vec<Player>,
    /// Current player index
    pub current_player: PlayerId,
    /// Undrawn tiles, front first
    pub deck: VecDeque<Arc<Tile>>,
    /// Face-up tiles
    pub market: Vec<Arc<Tile>>,
    /// Diversity awards already claimed, per category
    pub diversity_taken: DiversityFlags,
    /// Current game phase
    pub phase: GamePhase,
    /// Turn number (starts at 1)
    pub turn_number: u32,
}

/// A game as read from JSON, before its consistency checks
#[derive(Deserialize)]
struct GameSnapshot {
    rules: RuleSet,
    players: Vec<Player>,
    current_player: PlayerId,
    deck: VecDeque<Arc<Tile>>,
    market: Vec<Arc<Tile>>,
    diversity_taken: DiversityFlags,
    phase: GamePhase,
    turn_number: u32,
}

impl TryFrom<GameSnapshot> for GameState {
    type Error = SnapshotError;

    fn try_from(snapshot: GameSnapshot) -> Result<Self, Self::Error> {
        let state = GameState {
            rules: snapshot.rules,
            players: snapshot.players,
            current_player: snapshot.current_player,
            deck: snapshot.deck,
            market: snapshot.market,
            diversity_taken: snapshot.diversity_taken,
            phase: snapshot.phase,
            turn_number: snapshot.turn_number,
        };
        state.check_consistency()?;
        Ok(state)
    }
}

impl GameState {
    /// Create a new game with a random supply
    pub fn new(player_names: Vec<String>, rules: RuleSet) -> Result<Self, SetupError> {
        let mut rng = rand::thread_rng();
        Self::with_rng(player_names, rules, &mut rng)
    }

    /// Create a new game whose supply comes from `rng`
    pub fn with_rng<R: Rng>(
        player_names: Vec<String>,
        rules: RuleSet,
        rng: &mut R,
    ) -> Result<Self, SetupError> {
        rules.validate()?;
        let supply = Supply::standard_with_rng(&rules, player_names.len(), rng)?;
        Self::with_supply(player_names, rules, supply)
    }

    /// Create a new game from an explicit supply
    pub fn with_supply(
        player_names: Vec<String>,
        rules: RuleSet,
        supply: Supply,
    ) -> Result<Self, SetupError> {
        rules.validate()?;

        let count = player_names.len();
        if count == 0 {
            return Err(SetupError::NoPlayers);
        }
        let max = rules.max_players.min(PlayerId::MAX as usize);
        if count > max {
            return Err(SetupError::TooManyPlayers { count, max });
        }
        if supply.starters.len() < count {
            return Err(SetupError::NotEnoughStarters {
                needed: count,
                got: supply.starters.len(),
            });
        }
        if let Some(starter) = supply.starters.iter().find(|t| !t.is_starter()) {
            return Err(SetupError::NotAStarter(starter.id));
        }
        if let Some(tile) = supply.deck.iter().find(|t| !rules.accepts_tile(t)) {
            return Err(SetupError::TileNotInRules(tile.id));
        }

        let players = player_names
            .into_iter()
            .zip(supply.starters)
            .enumerate()
            .map(|(i, (name, starter))| {
                Player::new(
                    i as PlayerId,
                    name,
                    Board::with_starter(rules.starter_pos, starter),
                )
            })
            .collect();

        let mut deck = supply.deck;
        let market_len = rules.market_size.min(deck.len());
        let market = deck.drain(..market_len).collect();

        let diversity_taken = DiversityFlags::new(rules.category_count());
        debug!(players = count, deck = deck.len(), "game created");

        Ok(Self {
            rules,
            players,
            current_player: 0,
            deck,
            market,
            diversity_taken,
            phase: GamePhase::PickTile,
            turn_number: 1,
        })
    }

    /// Cross-field checks a loaded snapshot must pass. Tiles have already
    /// been checked one by one while deserializing.
    fn check_consistency(&self) -> Result<(), SnapshotError> {
        self.rules.validate()?;

        if self.players.is_empty() {
            return Err(SnapshotError::NoPlayers);
        }
        for (seat, player) in self.players.iter().enumerate() {
            if player.id as usize != seat {
                return Err(SnapshotError::SeatMismatch { seat, id: player.id });
            }
        }
        if self.get_player(self.current_player).is_none() {
            return Err(SnapshotError::UnknownCurrentPlayer(self.current_player));
        }

        let expected = self.rules.category_count();
        let got = self.diversity_taken.category_count();
        if got != expected {
            return Err(SnapshotError::DiversityFlagCount { expected, got });
        }

        let on_boards = self
            .players
            .iter()
            .flat_map(|p| p.board.tiles().map(|(_, tile)| tile));
        let supply = self.deck.iter().chain(&self.market).map(|tile| tile.as_ref());
        if let Some(tile) = on_boards.chain(supply).find(|t| !self.rules.accepts_tile(t)) {
            return Err(SnapshotError::TileNotInRules(tile.id));
        }

        if let GamePhase::PlaceTile { market_index } = self.phase {
            if market_index >= self.market.len() {
                return Err(SnapshotError::SelectionOutOfRange(market_index));
            }
        }
        Ok(())
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    fn get_player_mut(&mut self, id: PlayerId) -> Result<&mut Player, GameError> {
        self.players
            .get_mut(id as usize)
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Check if the game is finished
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Ended { .. })
    }

    /// The winners, once the game is finished
    pub fn winners(&self) -> Option<&[PlayerId]> {
        match &self.phase {
            GamePhase::Ended { winners } => Some(winners),
            _ => None,
        }
    }

    /// The tile waiting to be placed
    pub fn selected_tile(&self) -> Option<&Arc<Tile>> {
        match self.phase {
            GamePhase::PlaceTile { market_index } => self.market.get(market_index),
            _ => None,
        }
    }

    /// Final score of every player, in player order
    pub fn standings(&self) -> Vec<(PlayerId, u32)> {
        self.players
            .iter()
            .map(|p| (p.id, p.final_score(self.rules.coin_threshold)))
            .collect()
    }

    /// Get all currently valid actions for a player
    pub fn valid_actions(&self, player: PlayerId) -> Vec<GameAction> {
        let mut actions = Vec::new();
        if player != self.current_player {
            return actions;
        }

        match &self.phase {
            GamePhase::Ended { .. } => {
                // No actions when game is over
            }

            GamePhase::PickTile => {
                actions.extend((0..self.market.len()).map(GameAction::PickTile));
            }

            GamePhase::PlaceTile { market_index } => {
                if let Some(p) = self.get_player(player) {
                    actions.extend(valid_positions(&p.board).into_iter().map(GameAction::PlaceTile));
                }
                // Switching to another market tile
                actions.extend(
                    (0..self.market.len())
                        .filter(|i| i != market_index)
                        .map(GameAction::PickTile),
                );
            }

            GamePhase::ScoreShown { .. } => actions.push(GameAction::Acknowledge),
        }

        actions
    }

    /// Score the selected tile at `pos` for the current player without
    /// committing anything
    pub fn preview(&self, pos: TilePos) -> Result<ScoreResult, GameError> {
        let tile = self.selected_tile().ok_or(GameError::InvalidPhase)?;
        let player = self
            .get_player(self.current_player)
            .ok_or(GameError::UnknownPlayer(self.current_player))?;
        if !is_valid_placement(&player.board, pos) {
            return Err(GameError::IllegalPlacement(pos));
        }
        score_placement(&player.board, tile, pos, &self.rules.scoring)
            .map_err(|_| GameError::IllegalPlacement(pos))
    }

    /// Place the selected tile from raw coordinates
    pub fn place_at(&self, player: PlayerId, row: i32, col: i32) -> Result<Transition, GameError> {
        let action = GameAction::place_at(row, col)?;
        self.apply_action(player, action)
    }

    /// Apply an action, producing the next state. `self` is never modified,
    /// so a rejected action leaves the game exactly as it was.
    pub fn apply_action(&self, player: PlayerId, action: GameAction) -> Result<Transition, GameError> {
        let result = self.transition(player, action);
        if let Err(err) = &result {
            debug!(player, ?action, %err, "action rejected");
        }
        result
    }

    /// Apply an action in place, keeping the current state on rejection
    pub fn apply(&mut self, player: PlayerId, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        let Transition { state, events } = self.apply_action(player, action)?;
        *self = state;
        Ok(events)
    }

    fn transition(&self, player: PlayerId, action: GameAction) -> Result<Transition, GameError> {
        // Check game not over
        if self.is_finished() {
            return Err(GameError::GameOver);
        }
        if self.get_player(player).is_none() {
            return Err(GameError::UnknownPlayer(player));
        }
        if player != self.current_player {
            return Err(GameError::NotYourTurn);
        }

        match (&self.phase, action) {
            (GamePhase::PickTile | GamePhase::PlaceTile { .. }, GameAction::PickTile(index)) => {
                self.pick(player, index)
            }
            (GamePhase::PlaceTile { market_index }, GameAction::PlaceTile(pos)) => {
                self.place(player, *market_index, pos)
            }
            (GamePhase::ScoreShown { .. }, GameAction::Acknowledge) => self.acknowledge(player),
            _ => Err(GameError::InvalidPhase),
        }
    }

    // ==================== Transitions ====================

    fn pick(&self, player: PlayerId, market_index: usize) -> Result<Transition, GameError> {
        let tile = self
            .market
            .get(market_index)
            .ok_or(GameError::NoSuchMarketTile(market_index))?;

        let mut next = self.clone();
        next.phase = GamePhase::PlaceTile { market_index };
        debug!(player, market_index, tile = %tile.id, "tile picked");

        Ok(Transition {
            state: next,
            events: vec![GameEvent::TilePicked {
                player,
                market_index,
                tile: tile.id,
            }],
        })
    }

    fn place(&self, player: PlayerId, market_index: usize, pos: TilePos) -> Result<Transition, GameError> {
        let tile = self
            .market
            .get(market_index)
            .cloned()
            .ok_or(GameError::NoSuchMarketTile(market_index))?;
        let board = &self
            .get_player(player)
            .ok_or(GameError::UnknownPlayer(player))?
            .board;
        if !is_valid_placement(board, pos) {
            return Err(GameError::IllegalPlacement(pos));
        }
        let (board, score) = place_and_score(board, Arc::clone(&tile), pos, &self.rules.scoring)
            .map_err(|_| GameError::IllegalPlacement(pos))?;

        let mut next = self.clone();
        let mut events = vec![GameEvent::TilePlaced {
            player,
            tile: tile.id,
            pos,
            score: score.clone(),
        }];

        let threshold = next.rules.coin_threshold;
        let p = next.get_player_mut(player)?;
        p.board = board;
        let tokens = p.purse.deposit(score.total, threshold);
        if tokens > 0 {
            events.push(GameEvent::CoinsExchanged { player, tokens });
        }

        // The placed tile leaves the market; the deck tops it up
        next.market.remove(market_index);
        if let Some(refill) = next.deck.pop_front() {
            next.market.push(refill);
        }

        let awards = match next.get_player(player) {
            Some(p) => diversity_awards(p, &next.rules, &next.diversity_taken),
            None => Vec::new(),
        };
        for award in &awards {
            next.diversity_taken.mark(award.category);
            next.get_player_mut(player)?.awards.push(*award);
            events.push(GameEvent::AwardGranted {
                player,
                award: *award,
            });
        }

        debug!(
            player,
            tile = %tile.id,
            %pos,
            coins = score.total,
            regions = score.per_region.len(),
            awards = awards.len(),
            "tile placed"
        );
        next.phase = GamePhase::ScoreShown { score, awards };

        Ok(Transition {
            state: next,
            events,
        })
    }

    fn acknowledge(&self, player: PlayerId) -> Result<Transition, GameError> {
        let mut next = self.clone();
        let mut events = Vec::new();

        let board_full = self
            .get_player(player)
            .map_or(false, |p| p.board.is_full());
        let supply_out = self.market.is_empty() && self.deck.is_empty();

        if board_full || supply_out {
            next.finish(&mut events);
        } else {
            let following = ((player as usize + 1) % self.players.len()) as PlayerId;
            next.current_player = following;
            next.turn_number += 1;
            next.phase = GamePhase::PickTile;
            debug!(player, next = following, turn = next.turn_number, "turn ended");
            events.push(GameEvent::TurnEnded {
                player,
                next: following,
            });
        }

        Ok(Transition {
            state: next,
            events,
        })
    }

    /// Settle majority awards and move to `Ended`
    fn finish(&mut self, events: &mut Vec<GameEvent>) {
        let majority = evaluate_majority(&self.players, &self.rules);
        for (id, awards) in majority {
            if let Some(p) = self.players.get_mut(id as usize) {
                for award in awards {
                    p.awards.push(award);
                    events.push(GameEvent::AwardGranted { player: id, award });
                }
            }
        }

        let final_scores = self.standings();
        let best = final_scores.iter().map(|&(_, s)| s).max().unwrap_or(0);
        let winners: Vec<PlayerId> = final_scores
            .iter()
            .filter(|&&(_, s)| s == best)
            .map(|&(id, _)| id)
            .collect();

        info!(?final_scores, ?winners, turns = self.turn_number, "game ended");
        self.phase = GamePhase::Ended {
            winners: winners.clone(),
        };
        events.push(GameEvent::GameEnded {
            final_scores,
            winners,
        });
    }
}

/// Apply `action` for the current player. A rejected action, or any action
/// on a finished game, returns the prior state unchanged.
pub fn advance_phase(state: &GameState, action: GameAction) -> GameState {
    match state.apply_action(state.current_player, action) {
        Ok(transition) => transition.state,
        Err(_) => state.clone(),
    }
}
