//! Per-tile action effects and the notifications they produce.
//!
//! This module defines the closed set of tile effects, the chance deck, the
//! decision requests a tile can park against the presentation layer, and the
//! events the engine fans out to observers.

use crate::board::{PlayerId, TileId};
use crate::dice::DiceRoll;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Whether a ladder carries the player forward or backward along the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LadderDirection {
    Up,
    Down,
}

impl LadderDirection {
    /// Direction implied by a ladder's endpoints.
    pub fn between(from: TileId, to: TileId) -> Self {
        if to > from {
            LadderDirection::Up
        } else {
            LadderDirection::Down
        }
    }
}

/// Color group a property belongs to. Holding every member of a group
/// entitles the owner to full-cost rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColorGroup {
    Brown,
    Teal,
    Pink,
    Orange,
    Red,
    Yellow,
    Green,
    Indigo,
    Violet,
    /// The four landmark tiles chance cards can teleport to.
    Landmark,
}

/// Effect attached to a tile, invoked when a player occupies it.
///
/// One tile holds at most one action. `Property.owner` is the only field that
/// mutates after board construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileAction {
    /// Unconditionally relocate to another tile.
    Ladder {
        destination: TileId,
        direction: LadderDirection,
    },
    /// Relocate to the board's first tile.
    BackToStart,
    /// The player's next turn is consumed without a roll.
    Wait,
    /// Purchasable tile that charges rent while owned.
    Property {
        name: String,
        cost: i64,
        group: ColorGroup,
        owner: Option<PlayerId>,
    },
    /// Draw a random effect from the chance deck.
    Chance,
    /// Choice between a percentage of current funds and a fixed amount.
    Tax { percent: u32, fixed: i64 },
    /// Unconditional fixed deduction.
    WealthTax { amount: i64 },
    /// Credits the pass-go reward when landed on directly.
    Start,
    /// Holds jailed players; "just visiting" otherwise.
    Jail,
    /// Sends the player to jail.
    GoToJail { jail_tile: TileId },
    /// Grants one-shot rent immunity.
    FreeParking,
}

impl TileAction {
    /// Property name, if this is a property tile.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            TileAction::Property { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Current owner, if this is a property tile.
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            TileAction::Property { owner, .. } => *owner,
            _ => None,
        }
    }
}

/// The six chance effects, drawn uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanceCard {
    /// Move forward three tiles and trigger the landing action.
    AdvanceThree,
    /// Fixed credit.
    Windfall,
    /// Fixed debit; a shortfall bankrupts.
    Fine,
    /// Teleport to the landmark for the current position bucket.
    NearestLandmark,
    /// Every other active player pays this player a fixed amount.
    CollectFromEach,
    /// This player pays every other active player a fixed amount.
    PayEach,
}

impl ChanceCard {
    /// All cards in the deck.
    pub const ALL: [ChanceCard; 6] = [
        ChanceCard::AdvanceThree,
        ChanceCard::Windfall,
        ChanceCard::Fine,
        ChanceCard::NearestLandmark,
        ChanceCard::CollectFromEach,
        ChanceCard::PayEach,
    ];

    /// Draw a card uniformly at random.
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// A human choice a tile action has parked against the presentation layer.
///
/// The engine suspends with the request outstanding; the matching `resolve_*`
/// call on the engine must be invoked exactly once to continue the turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionRequest {
    /// Buy the unowned property or decline.
    PropertyPurchase {
        player: PlayerId,
        tile: TileId,
        cost: i64,
    },
    /// Pay a percentage of current funds or the fixed amount.
    TaxChoice {
        player: PlayerId,
        tile: TileId,
        percent: u32,
        fixed: i64,
    },
    /// Pay bail or attempt to roll doubles.
    JailChoice {
        player: PlayerId,
        tile: TileId,
        bail: i64,
    },
}

impl DecisionRequest {
    /// The player the decision belongs to.
    pub fn player(&self) -> PlayerId {
        match self {
            DecisionRequest::PropertyPurchase { player, .. }
            | DecisionRequest::TaxChoice { player, .. }
            | DecisionRequest::JailChoice { player, .. } => *player,
        }
    }
}

/// Why a jailed player was let out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseReason {
    /// Paid the fixed bail.
    Bail,
    /// Rolled doubles.
    Doubles,
    /// Served the maximum number of jail turns.
    Served,
}

/// Notifications fanned out to observers as the engine mutates state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The active player changed.
    CurrentPlayerChanged { player: PlayerId },

    /// Dice were rolled.
    DiceRolled { player: PlayerId, roll: DiceRoll },

    /// A player moved. `steps` is the dice value for rolled moves and 0 for
    /// relocations (ladders, back-to-start, jail, teleports).
    PlayerMoved {
        player: PlayerId,
        from: TileId,
        to: TileId,
        steps: u32,
    },

    /// A pending skip was consumed instead of rolling.
    TurnSkipped { player: PlayerId },

    /// A wait tile scheduled a skipped turn.
    WaitScheduled { player: PlayerId },

    /// The pass-go reward was credited.
    PassGoCredited { player: PlayerId, reward: i64 },

    /// An unowned property was bought.
    PropertyPurchased {
        player: PlayerId,
        tile: TileId,
        cost: i64,
    },

    /// A purchase offer was declined (or could not be funded).
    PurchaseDeclined { player: PlayerId, tile: TileId },

    /// Rent changed hands.
    RentPaid {
        player: PlayerId,
        owner: PlayerId,
        tile: TileId,
        amount: i64,
    },

    /// Free-parking immunity absorbed a rent charge.
    RentWaived { player: PlayerId, tile: TileId },

    /// A tax or wealth-tax deduction completed.
    TaxPaid {
        player: PlayerId,
        tile: TileId,
        amount: i64,
    },

    /// A chance card was drawn.
    ChanceDrawn { player: PlayerId, card: ChanceCard },

    /// A chance credit was received.
    CreditReceived { player: PlayerId, amount: i64 },

    /// A chance fine was paid.
    FinePaid { player: PlayerId, amount: i64 },

    /// Funds moved between two players.
    MoneyTransferred {
        from: PlayerId,
        to: PlayerId,
        amount: i64,
    },

    /// A player was sent to jail.
    PlayerJailed { player: PlayerId, jail_tile: TileId },

    /// A jailed player was released.
    PlayerReleased {
        player: PlayerId,
        reason: ReleaseReason,
    },

    /// One-shot rent immunity was granted.
    FreeParkingClaimed { player: PlayerId },

    /// A tile action needs a human choice before the turn can continue.
    DecisionRequested { request: DecisionRequest },

    /// A payment failed and the payer left the game.
    PlayerBankrupt { player: PlayerId },

    /// The game is over.
    GameWon { player: PlayerId },
}
