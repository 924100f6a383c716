//! WebAssembly bindings for the shop engine.
//!
//! This module exposes the game engine to JavaScript through wasm-bindgen.
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::actions::GameAction;
use crate::bot::{Bot, BotStrategy};
use crate::game::{advance_phase, GameState};
use crate::grid::TilePos;
use crate::rules::RuleSet;
use crate::validation::valid_positions;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed game wrapper
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game. `rules_json` may be empty for the default rules.
    #[wasm_bindgen(constructor)]
    pub fn new(player_names_json: &str, rules_json: &str) -> Result<WasmGame, JsValue> {
        let player_names: Vec<String> = serde_json::from_str(player_names_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid player names: {}", e)))?;

        let rules = if rules_json.trim().is_empty() {
            RuleSet::default()
        } else {
            RuleSet::from_json_str(rules_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid rules: {}", e)))?
        };

        let state = GameState::new(player_names, rules)
            .map_err(|e| JsValue::from_str(&format!("Cannot start game: {}", e)))?;
        Ok(WasmGame { state })
    }

    /// Get the current game state as JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current player ID
    #[wasm_bindgen(js_name = getCurrentPlayer)]
    pub fn get_current_player(&self) -> u8 {
        self.state.current_player
    }

    /// Get valid actions for the current player as JSON array
    #[wasm_bindgen(js_name = getValidActions)]
    pub fn get_valid_actions(&self) -> String {
        let actions = self.state.valid_actions(self.state.current_player);
        serde_json::to_string(&actions).unwrap_or_else(|_| "[]".to_string())
    }

    /// Legal slots on a player's board as a JSON array of `[row, col]`
    #[wasm_bindgen(js_name = getValidPositions)]
    pub fn get_valid_positions(&self, player: u8) -> String {
        match self.state.get_player(player) {
            Some(p) => {
                let positions: Vec<TilePos> = valid_positions(&p.board).into_iter().collect();
                serde_json::to_string(&positions).unwrap_or_else(|_| "[]".to_string())
            }
            None => "[]".to_string(),
        }
    }

    /// Score the selected tile at a slot without placing it
    #[wasm_bindgen]
    pub fn preview(&self, row: i32, col: i32) -> Result<String, JsValue> {
        let pos = TilePos::new(row, col).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let score = self
            .state
            .preview(pos)
            .map_err(|e| JsValue::from_str(&format!("Preview failed: {}", e)))?;
        Ok(serde_json::to_string(&score).unwrap_or_else(|_| "null".to_string()))
    }

    /// Apply an action from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyAction)]
    pub fn apply_action(&mut self, player: u8, action_json: &str) -> Result<String, JsValue> {
        let action: GameAction = serde_json::from_str(action_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid action JSON: {}", e)))?;

        match self.state.apply(player, action) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Action failed: {}", e))),
        }
    }

    /// Apply an action for the current player; rejected actions are ignored.
    /// Returns whether the state changed.
    #[wasm_bindgen]
    pub fn advance(&mut self, action_json: &str) -> bool {
        let Ok(action) = serde_json::from_str::<GameAction>(action_json) else {
            return false;
        };
        let next = advance_phase(&self.state, action);
        let changed = next != self.state;
        self.state = next;
        changed
    }

    /// Check if the game is finished
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Get the winners (empty until the game is finished)
    #[wasm_bindgen(js_name = getWinners)]
    pub fn get_winners(&self) -> Vec<u8> {
        self.state.winners().map(<[u8]>::to_vec).unwrap_or_default()
    }

    /// Final scores as a JSON array of `[player, score]`
    #[wasm_bindgen(js_name = getStandings)]
    pub fn get_standings(&self) -> String {
        serde_json::to_string(&self.state.standings()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Get the current phase as JSON
    #[wasm_bindgen(js_name = getPhase)]
    pub fn get_phase(&self) -> String {
        serde_json::to_string(&self.state.phase).unwrap_or_else(|_| "\"Unknown\"".to_string())
    }

    /// Get a specific player's state as JSON
    #[wasm_bindgen(js_name = getPlayer)]
    pub fn get_player(&self, player: u8) -> String {
        if let Some(p) = self.state.get_player(player) {
            serde_json::to_string(p).unwrap_or_else(|_| "{}".to_string())
        } else {
            "null".to_string()
        }
    }

    /// Get a bot's suggested action for a player
    /// strategy: "Random" or "Greedy"
    #[wasm_bindgen(js_name = getBotAction)]
    pub fn get_bot_action(&self, player: u8, strategy: &str) -> String {
        let strategy = match strategy {
            "Random" => BotStrategy::Random,
            _ => BotStrategy::Greedy,
        };

        let mut bot = Bot::new(player, strategy);
        match bot.choose_action(&self.state) {
            Some(action) => serde_json::to_string(&action).unwrap_or_else(|_| "null".to_string()),
            None => "null".to_string(),
        }
    }
}
