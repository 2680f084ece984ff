//! Dice primitives.
//!
//! A [`Die`] is an independent uniform generator over 1..=6 that remembers its
//! last value for display. A [`DiceSet`] aggregates a fixed number of dice and
//! produces [`DiceRoll`] value objects.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of faces on a die.
pub const DIE_SIDES: u8 = 6;

/// A single six-sided die.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Die {
    last_value: Option<u8>,
}

impl Die {
    /// Create a die that has not been rolled yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Roll the die, remembering the value.
    pub fn roll<R: Rng>(&mut self, rng: &mut R) -> u8 {
        let value = rng.gen_range(1..=DIE_SIDES);
        self.last_value = Some(value);
        value
    }

    /// The value of the most recent roll, if any.
    pub fn last_value(&self) -> Option<u8> {
        self.last_value
    }
}

/// A fixed-size set of dice rolled together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSet {
    dice: Vec<Die>,
}

impl DiceSet {
    /// Create a set with `count` dice.
    pub fn new(count: usize) -> Self {
        assert!(count > 0, "a dice set needs at least one die");
        Self {
            dice: vec![Die::new(); count],
        }
    }

    /// Number of dice in the set.
    pub fn count(&self) -> usize {
        self.dice.len()
    }

    /// Roll every die in the set.
    pub fn roll<R: Rng>(&mut self, rng: &mut R) -> DiceRoll {
        let values = self.dice.iter_mut().map(|die| die.roll(rng)).collect();
        DiceRoll::new(values)
    }

    /// Last values of every die, for display between rolls.
    pub fn last_values(&self) -> Vec<Option<u8>> {
        self.dice.iter().map(Die::last_value).collect()
    }
}

/// The outcome of rolling a [`DiceSet`] once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    values: Vec<u8>,
}

impl DiceRoll {
    /// Wrap raw die values. Useful for replays and scripted turns.
    pub fn new(values: Vec<u8>) -> Self {
        assert!(!values.is_empty(), "a roll needs at least one value");
        Self { values }
    }

    /// Individual die values.
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Sum of all dice.
    pub fn total(&self) -> u32 {
        self.values.iter().map(|&v| u32::from(v)).sum()
    }

    /// True when two or more dice all show the same face.
    pub fn is_doubles(&self) -> bool {
        self.values.len() >= 2 && self.values.iter().all(|&v| v == self.values[0])
    }
}
