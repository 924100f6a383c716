//! Toyshop - a tile-placement shop puzzle engine
//!
//! This crate provides the core game logic, including:
//! - Tile and board model on a 4×4 grid of 2×2-cell tiles
//! - Placement validity
//! - Region resolution with connector cells
//! - Placement scoring under configurable conventions
//! - Diversity and majority awards
//! - Turn state machine
//!
//! # Architecture
//!
//! The game engine is designed to be platform-agnostic. It can be compiled to:
//! - Native Rust for headless simulation
//! - WebAssembly for a browser front end
//!
//! # Modules
//!
//! - [`grid`]: Tile and cell coordinates
//! - [`tile`]: Tiles, blocks and categories
//! - [`rules`]: Rule-set configuration
//! - [`board`]: Copy-on-write board
//! - [`validation`]: Legal placement slots
//! - [`region`]: Connected regions through connectors
//! - [`scoring`]: Placement scoring
//! - [`player`]: Player state and currency
//! - [`awards`]: Diversity and majority awards
//! - [`supply`]: Tile deck generation
//! - [`game`]: Game state machine

pub mod actions;
pub mod awards;
pub mod board;
pub mod bot;
pub mod game;
pub mod grid;
pub mod player;
pub mod region;
pub mod rules;
pub mod scoring;
pub mod supply;
pub mod tile;
pub mod validation;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use awards::{diversity_awards, evaluate_diversity, evaluate_majority, has_diversity, DiversityFlags};
pub use board::{Board, BoardError, CellContent};
pub use bot::{Bot, BotStrategy};
pub use game::{advance_phase, GameError, GamePhase, GameState, SetupError, SnapshotError, Transition};
pub use grid::{CellPos, Direction, OutOfBounds, TilePos};
pub use player::{Award, AwardKind, Player, PlayerId, Purse};
pub use region::{find_region, Region};
pub use rules::{CategoryDef, RuleSet, RuleSetError};
pub use scoring::{place_and_score, score_placement, RegionScore, RegionScoring, ScoreResult, ScoringRule};
pub use supply::{Supply, TileFactory};
pub use tile::{Block, BlockKind, Category, CellSet, ItemId, Tile, TileError, TileId, TileLayout};
pub use validation::{is_valid_placement, valid_positions};
