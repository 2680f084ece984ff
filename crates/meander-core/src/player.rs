//! Player state.
//!
//! This module contains:
//! - Player struct with funds, board position, and holdings
//! - Typed per-turn flags (skip, jail, free parking)
//! - Token types for display

use crate::board::{PlayerId, TileId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Funds every player starts the game with.
pub const STARTING_MONEY: i64 = 1500;

/// Playing piece a player moves around the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Boot,
    TopHat,
    Ship,
    Dog,
    Cat,
    Thimble,
    Wheelbarrow,
    Racecar,
}

impl Token {
    /// All tokens, in default assignment order.
    pub const ALL: [Token; 8] = [
        Token::Boot,
        Token::TopHat,
        Token::Ship,
        Token::Dog,
        Token::Cat,
        Token::Thimble,
        Token::Wheelbarrow,
        Token::Racecar,
    ];

    /// Default token for a player index.
    pub fn for_player(id: PlayerId) -> Self {
        Self::ALL[id as usize % Self::ALL.len()]
    }

    /// Stable name used in the player file.
    pub fn name(&self) -> &'static str {
        match self {
            Token::Boot => "Boot",
            Token::TopHat => "TopHat",
            Token::Ship => "Ship",
            Token::Dog => "Dog",
            Token::Cat => "Cat",
            Token::Thimble => "Thimble",
            Token::Wheelbarrow => "Wheelbarrow",
            Token::Racecar => "Racecar",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Token {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Token::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| format!("unknown token '{}'", s))
    }
}

/// A single player's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Roster index (stable for the session)
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Playing piece
    pub token: Token,
    /// Current funds; never implicitly negative
    pub money: i64,
    /// Occupied tile; set when the game is initialized
    pub position: Option<TileId>,
    /// Tile ids of owned properties
    pub owned: BTreeSet<TileId>,
    /// Next turn is consumed without rolling
    pub skip_next_turn: bool,
    /// Out of the game; stays in the roster as the losing record
    pub bankrupt: bool,
    /// Currently held in jail
    pub jailed: bool,
    /// Turns spent jailed since the last arrest
    pub jail_turns: u8,
    /// One-shot rent immunity
    pub free_parking: bool,
}

impl Player {
    /// Create a new player with starting funds and no position.
    pub fn new(id: PlayerId, name: String, token: Token) -> Self {
        Self {
            id,
            name,
            token,
            money: STARTING_MONEY,
            position: None,
            owned: BTreeSet::new(),
            skip_next_turn: false,
            bankrupt: false,
            jailed: false,
            jail_turns: 0,
            free_parking: false,
        }
    }

    /// Whether the player still takes part in turn rotation.
    pub fn is_active(&self) -> bool {
        !self.bankrupt
    }

    /// Whether the player can cover `amount` in full.
    pub fn can_afford(&self, amount: i64) -> bool {
        self.money >= amount
    }

    /// Attempt a deduction. Either the full amount is deducted, or nothing is
    /// and `false` is returned; the caller routes failure into bankruptcy.
    pub fn try_pay(&mut self, amount: i64) -> bool {
        debug_assert!(amount >= 0, "payments are non-negative");
        if self.money < amount {
            return false;
        }
        self.money -= amount;
        true
    }

    /// Credit funds.
    pub fn receive(&mut self, amount: i64) {
        debug_assert!(amount >= 0, "credits are non-negative");
        self.money += amount;
    }
}
