//! Meander - a turn-based tile-path board game engine
//!
//! This crate provides the core game logic for Meander, including:
//! - An id-indexed tile graph with race-chain and property-ring variants
//! - Player state, funds, and holdings with bankruptcy handling
//! - A closed set of per-tile action effects
//! - A turn state machine with a two-phase decision port for human choices
//! - An observer protocol that decouples the engine from any renderer
//! - Round-trip persistence of board layout and player roster
//!
//! # Architecture
//!
//! The engine is presentation-agnostic: a frontend drives it through
//! [`Game`]'s turn operations and the decision-port resolvers, and re-renders
//! from the events fanned out to subscribed [`GameObserver`]s. Persistence
//! sits beside the engine and snapshots board + roster independently of any
//! live session.
//!
//! # Modules
//!
//! - [`board`]: Tile graph, variants, and board builders
//! - [`actions`]: Tile action effects, chance deck, decisions, and events
//! - [`player`]: Player state and tokens
//! - [`dice`]: Dice primitives
//! - [`game`]: Game state machine
//! - [`observer`]: Observer notification protocol
//! - [`save`]: Board and roster codecs and save slots

pub mod actions;
pub mod board;
pub mod dice;
pub mod game;
pub mod observer;
pub mod player;
pub mod save;

// Re-export commonly used types
pub use actions::{
    ChanceCard, ColorGroup, DecisionRequest, GameEvent, LadderDirection, ReleaseReason, TileAction,
};
pub use board::{Board, BoardVariant, PlayerId, Tile, TileId};
pub use dice::{DiceRoll, DiceSet, Die};
pub use game::{Game, GameError, GamePhase};
pub use observer::{GameObserver, ObserverId, ObserverRegistry};
pub use player::{Player, Token, STARTING_MONEY};
pub use save::{
    load_game, read_board, read_roster, save_game, write_board, write_roster, BoardFileError,
    PlayerFileError, SaveError,
};
