//! Core turn state machine.
//!
//! This module contains the main `Game` struct and all cross-player rules:
//! dice rolls, movement, tile-action resolution, rent and transfers, the
//! decision port, turn rotation, and win/bankruptcy detection.

use crate::actions::{
    ChanceCard, ColorGroup, DecisionRequest, GameEvent, ReleaseReason, TileAction,
};
use crate::board::{Board, BoardVariant, PlayerId, TileId};
use crate::dice::{DiceRoll, DiceSet};
use crate::observer::{GameObserver, ObserverId, ObserverRegistry};
use crate::player::{Player, Token};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, warn};

/// Reward for passing or landing on the first tile of the property ring.
pub const PASS_GO_REWARD: i64 = 200;

/// Fixed bail a jailed player may pay.
pub const JAIL_BAIL: i64 = 50;

/// Jail turns after which release is unconditional.
pub const JAIL_MAX_TURNS: u8 = 3;

/// Chance card amounts.
const CHANCE_WINDFALL: i64 = 150;
const CHANCE_FINE: i64 = 100;
const CHANCE_TRANSFER: i64 = 50;
const CHANCE_ADVANCE_STEPS: u32 = 3;

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Roster assembly; no turns yet
    NotStarted,
    /// Turns are being taken
    InProgress,
    /// Terminal; no further operations succeed
    Over { winner: PlayerId },
}

/// Errors that can occur when driving the engine
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameError {
    #[error("game has not been started")]
    NotStarted,

    #[error("game has already been started")]
    AlreadyStarted,

    #[error("game is over")]
    GameOver,

    #[error("a decision is pending and must be resolved first")]
    DecisionPending,

    #[error("no decision is pending")]
    NoPendingDecision,

    #[error("response does not match the pending decision")]
    DecisionMismatch,

    #[error("tile {0} does not exist on this board")]
    IllegalTileReference(TileId),

    #[error("invalid player: {0}")]
    InvalidPlayer(String),

    #[error("board has no tiles")]
    EmptyBoard,
}

/// The complete engine state for one session.
#[derive(Debug)]
pub struct Game {
    board: Board,
    players: Vec<Player>,
    dice: DiceSet,
    active: usize,
    phase: GamePhase,
    pending: Option<DecisionRequest>,
    extra_turn: bool,
    observers: ObserverRegistry,
    rng: StdRng,
}

impl Game {
    /// Create a session on a freshly built board.
    pub fn new(variant: BoardVariant) -> Self {
        Self::with_board(Board::build(variant), StdRng::from_entropy())
    }

    /// Create a session with a fixed RNG seed, for deterministic replays.
    pub fn with_seed(variant: BoardVariant, seed: u64) -> Self {
        Self::with_board(Board::build(variant), StdRng::seed_from_u64(seed))
    }

    /// Reassemble a session from persisted parts. The caller still `start`s
    /// the game; players keep their persisted positions.
    pub(crate) fn from_loaded(board: Board, players: Vec<Player>, active: usize) -> Self {
        let mut game = Self::with_board(board, StdRng::from_entropy());
        game.players = players;
        game.active = active;
        game
    }

    fn with_board(board: Board, rng: StdRng) -> Self {
        let dice = DiceSet::new(board.variant().dice_count());
        Self {
            board,
            players: Vec::new(),
            dice,
            active: 0,
            phase: GamePhase::NotStarted,
            pending: None,
            extra_turn: false,
            observers: ObserverRegistry::new(),
            rng,
        }
    }

    // ==================== Accessors ====================

    /// The board this session plays on.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The variant this session plays.
    pub fn variant(&self) -> BoardVariant {
        self.board.variant()
    }

    /// The full roster, bankrupt players included.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Whether the session has reached its terminal state.
    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Over { .. })
    }

    /// The winner, once the game is over.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            GamePhase::Over { winner } => Some(winner),
            _ => None,
        }
    }

    /// The player whose turn it is (or will be, before the game starts).
    pub fn active_player(&self) -> Option<&Player> {
        self.players.get(self.active)
    }

    /// The outstanding decision, if a tile action is waiting on one.
    pub fn pending_decision(&self) -> Option<&DecisionRequest> {
        self.pending.as_ref()
    }

    /// The dice set, for last-roll display.
    pub fn dice(&self) -> &DiceSet {
        &self.dice
    }

    // ==================== Observers ====================

    /// Register an observer for engine notifications.
    pub fn subscribe(&self, observer: Rc<dyn GameObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn notify(&self, events: &[GameEvent]) {
        self.observers.dispatch_all(events);
    }

    // ==================== Roster ====================

    /// Add a player with the first free token.
    pub fn add_player(&mut self, name: &str) -> Result<PlayerId, GameError> {
        let token = Token::ALL
            .into_iter()
            .find(|t| !self.players.iter().any(|p| p.token == *t))
            .ok_or_else(|| GameError::InvalidPlayer("no tokens left".to_string()))?;
        self.add_player_with_token(name, token)
    }

    /// Add a player with a chosen token.
    pub fn add_player_with_token(
        &mut self,
        name: &str,
        token: Token,
    ) -> Result<PlayerId, GameError> {
        if !matches!(self.phase, GamePhase::NotStarted) {
            return Err(GameError::AlreadyStarted);
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidPlayer("empty name".to_string()));
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(GameError::InvalidPlayer(format!(
                "duplicate name '{}'",
                name
            )));
        }
        if self.players.iter().any(|p| p.token == token) {
            return Err(GameError::InvalidPlayer(format!(
                "token {} already taken",
                token
            )));
        }
        if self.players.len() >= Token::ALL.len() {
            return Err(GameError::InvalidPlayer("roster is full".to_string()));
        }

        let id = self.players.len() as PlayerId;
        self.players.push(Player::new(id, name.to_string(), token));
        Ok(id)
    }

    // ==================== Turn state machine ====================

    /// Begin play: place players without positions on the first tile, pick
    /// the active player, and announce them.
    pub fn start(&mut self) -> Result<Vec<GameEvent>, GameError> {
        match self.phase {
            GamePhase::NotStarted => {}
            GamePhase::InProgress => return Err(GameError::AlreadyStarted),
            GamePhase::Over { .. } => return Err(GameError::GameOver),
        }
        if self.players.is_empty() {
            return Err(GameError::InvalidPlayer(
                "at least one player is required".to_string(),
            ));
        }

        let first = self.board.first_tile_id().ok_or(GameError::EmptyBoard)?;
        for player in &mut self.players {
            if player.position.is_none() {
                player.position = Some(first);
            }
        }
        if let Some(idx) = self.first_active_from(self.active) {
            self.active = idx;
        }
        self.phase = GamePhase::InProgress;
        debug!(variant = ?self.variant(), players = self.players.len(), "game started");

        let mut events = Vec::new();
        if let Some(player) = self.players.get(self.active) {
            if player.is_active() {
                events.push(GameEvent::CurrentPlayerChanged { player: player.id });
            }
        }
        self.notify(&events);
        Ok(events)
    }

    /// Roll the dice for the active player and play out the move.
    pub fn process_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.run_turn(None)
    }

    /// Play out the active player's move with an explicit roll. Useful for
    /// replays and scripted sessions; skip and jail handling still apply.
    pub fn process_turn_with_roll(&mut self, roll: DiceRoll) -> Result<Vec<GameEvent>, GameError> {
        self.run_turn(Some(roll))
    }

    fn run_turn(&mut self, forced: Option<DiceRoll>) -> Result<Vec<GameEvent>, GameError> {
        self.guard_turn()?;
        let idx = self.active;
        if !self.players[idx].is_active() {
            return Err(GameError::InvalidPlayer(format!(
                "{} is bankrupt",
                self.players[idx].name
            )));
        }

        let mut events = Vec::new();

        if self.players[idx].skip_next_turn {
            self.players[idx].skip_next_turn = false;
            events.push(GameEvent::TurnSkipped {
                player: self.players[idx].id,
            });
            self.notify(&events);
            return Ok(events);
        }

        if self.players[idx].jailed {
            self.jail_turn(idx, &mut events)?;
            self.notify(&events);
            return Ok(events);
        }

        let roll = match forced {
            Some(roll) => roll,
            None => self.dice.roll(&mut self.rng),
        };
        events.push(GameEvent::DiceRolled {
            player: self.players[idx].id,
            roll: roll.clone(),
        });
        self.resolve_roll(idx, roll, &mut events)?;
        self.notify(&events);
        Ok(events)
    }

    /// Rotate to the next non-bankrupt player, honoring a pending extra turn.
    pub fn advance_to_next_player(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.guard_turn()?;
        let mut events = Vec::new();
        let before = self.active;

        if self.extra_turn {
            self.extra_turn = false;
        } else {
            let n = self.players.len();
            // Full cycle at most, so a lone survivor terminates the rotation.
            for k in 1..=n {
                let idx = (before + k) % n;
                if self.players[idx].is_active() {
                    self.active = idx;
                    break;
                }
            }
        }

        if self.active != before {
            events.push(GameEvent::CurrentPlayerChanged {
                player: self.players[self.active].id,
            });
        }
        self.check_win(&mut events);
        self.notify(&events);
        Ok(events)
    }

    fn guard_turn(&self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::NotStarted => Err(GameError::NotStarted),
            GamePhase::Over { .. } => Err(GameError::GameOver),
            GamePhase::InProgress => {
                if self.pending.is_some() {
                    Err(GameError::DecisionPending)
                } else {
                    Ok(())
                }
            }
        }
    }

    fn first_active_from(&self, from: usize) -> Option<usize> {
        let n = self.players.len();
        (0..n)
            .map(|k| (from + k) % n)
            .find(|&i| self.players[i].is_active())
    }

    // ==================== Movement ====================

    fn resolve_roll(
        &mut self,
        idx: usize,
        roll: DiceRoll,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let player_id = self.players[idx].id;
        let steps = roll.total();
        let from = self.players[idx].position.ok_or(GameError::NotStarted)?;
        let to = self
            .board
            .walk(from, steps)
            .ok_or(GameError::IllegalTileReference(from))?;

        if self.variant().is_property() {
            // A destination below the origin means the walk wrapped past go.
            if to < from {
                self.players[idx].receive(PASS_GO_REWARD);
                events.push(GameEvent::PassGoCredited {
                    player: player_id,
                    reward: PASS_GO_REWARD,
                });
            }
            if roll.is_doubles() {
                self.extra_turn = true;
            }
        }

        self.players[idx].position = Some(to);
        events.push(GameEvent::PlayerMoved {
            player: player_id,
            from,
            to,
            steps,
        });
        debug!(player = %self.players[idx].name, from, to, steps, "moved");

        self.trigger_tile_action(idx, to, events)?;
        self.check_win(events);
        Ok(())
    }

    fn relocate(&mut self, idx: usize, from: TileId, to: TileId, events: &mut Vec<GameEvent>) {
        self.players[idx].position = Some(to);
        events.push(GameEvent::PlayerMoved {
            player: self.players[idx].id,
            from,
            to,
            steps: 0,
        });
    }

    // ==================== Tile action dispatch ====================

    fn trigger_tile_action(
        &mut self,
        idx: usize,
        tile_id: TileId,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let action = match self.board.get_tile(tile_id) {
            Some(tile) => match &tile.action {
                Some(action) => action.clone(),
                None => return Ok(()),
            },
            None => return Err(GameError::IllegalTileReference(tile_id)),
        };
        let player_id = self.players[idx].id;

        match action {
            TileAction::Ladder { destination, .. } => {
                if self.board.get_tile(destination).is_none() {
                    warn!(tile = tile_id, destination, "ladder points at a missing tile");
                    return Err(GameError::IllegalTileReference(destination));
                }
                self.relocate(idx, tile_id, destination, events);
            }

            TileAction::BackToStart => {
                let first = self.board.first_tile_id().ok_or(GameError::EmptyBoard)?;
                self.relocate(idx, tile_id, first, events);
            }

            TileAction::Wait => {
                self.players[idx].skip_next_turn = true;
                events.push(GameEvent::WaitScheduled { player: player_id });
            }

            TileAction::Property {
                cost, group, owner, ..
            } => {
                self.handle_property(idx, tile_id, cost, group, owner, events);
            }

            TileAction::Chance => {
                let card = ChanceCard::draw(&mut self.rng);
                events.push(GameEvent::ChanceDrawn {
                    player: player_id,
                    card,
                });
                self.apply_chance(idx, card, events)?;
            }

            TileAction::Tax { percent, fixed } => {
                let request = DecisionRequest::TaxChoice {
                    player: player_id,
                    tile: tile_id,
                    percent,
                    fixed,
                };
                self.pending = Some(request.clone());
                events.push(GameEvent::DecisionRequested { request });
            }

            TileAction::WealthTax { amount } => {
                if self.charge(idx, amount, events) {
                    events.push(GameEvent::TaxPaid {
                        player: player_id,
                        tile: tile_id,
                        amount,
                    });
                }
            }

            TileAction::Start => {
                self.players[idx].receive(PASS_GO_REWARD);
                events.push(GameEvent::PassGoCredited {
                    player: player_id,
                    reward: PASS_GO_REWARD,
                });
            }

            TileAction::Jail => {
                if self.players[idx].jailed {
                    self.jail_stay(idx, tile_id, events);
                }
                // Not jailed: just visiting.
            }

            TileAction::GoToJail { jail_tile } => {
                if self.board.get_tile(jail_tile).is_none() {
                    warn!(tile = tile_id, jail_tile, "go-to-jail points at a missing tile");
                    return Err(GameError::IllegalTileReference(jail_tile));
                }
                self.relocate(idx, tile_id, jail_tile, events);
                self.players[idx].jailed = true;
                self.players[idx].jail_turns = 0;
                self.players[idx].skip_next_turn = true;
                self.extra_turn = false;
                events.push(GameEvent::PlayerJailed {
                    player: player_id,
                    jail_tile,
                });
            }

            TileAction::FreeParking => {
                self.players[idx].free_parking = true;
                events.push(GameEvent::FreeParkingClaimed { player: player_id });
            }
        }
        Ok(())
    }

    fn handle_property(
        &mut self,
        idx: usize,
        tile_id: TileId,
        cost: i64,
        group: ColorGroup,
        owner: Option<PlayerId>,
        events: &mut Vec<GameEvent>,
    ) {
        let player_id = self.players[idx].id;
        match owner {
            None => {
                let request = DecisionRequest::PropertyPurchase {
                    player: player_id,
                    tile: tile_id,
                    cost,
                };
                self.pending = Some(request.clone());
                events.push(GameEvent::DecisionRequested { request });
            }

            Some(owner_id) if owner_id == player_id => {
                // Own property: nothing happens.
            }

            Some(owner_id) => {
                if self.players[idx].free_parking {
                    self.players[idx].free_parking = false;
                    events.push(GameEvent::RentWaived {
                        player: player_id,
                        tile: tile_id,
                    });
                    return;
                }

                let rent = if self.board.owner_holds_group(group, owner_id) {
                    cost
                } else {
                    cost * 2 / 10
                };
                if self.transfer(idx, owner_id as usize, rent, events) {
                    events.push(GameEvent::RentPaid {
                        player: player_id,
                        owner: owner_id,
                        tile: tile_id,
                        amount: rent,
                    });
                }
            }
        }
    }

    fn apply_chance(
        &mut self,
        idx: usize,
        card: ChanceCard,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        let player_id = self.players[idx].id;
        match card {
            ChanceCard::AdvanceThree => {
                let from = self.players[idx].position.ok_or(GameError::NotStarted)?;
                let to = self
                    .board
                    .walk(from, CHANCE_ADVANCE_STEPS)
                    .ok_or(GameError::IllegalTileReference(from))?;
                if self.variant().is_property() && to < from {
                    self.players[idx].receive(PASS_GO_REWARD);
                    events.push(GameEvent::PassGoCredited {
                        player: player_id,
                        reward: PASS_GO_REWARD,
                    });
                }
                self.players[idx].position = Some(to);
                events.push(GameEvent::PlayerMoved {
                    player: player_id,
                    from,
                    to,
                    steps: CHANCE_ADVANCE_STEPS,
                });
                let lands_on_chance = matches!(
                    self.board.get_tile(to).and_then(|t| t.action.as_ref()),
                    Some(TileAction::Chance)
                );
                if !lands_on_chance {
                    self.trigger_tile_action(idx, to, events)?;
                }
            }

            ChanceCard::Windfall => {
                self.players[idx].receive(CHANCE_WINDFALL);
                events.push(GameEvent::CreditReceived {
                    player: player_id,
                    amount: CHANCE_WINDFALL,
                });
            }

            ChanceCard::Fine => {
                if self.charge(idx, CHANCE_FINE, events) {
                    events.push(GameEvent::FinePaid {
                        player: player_id,
                        amount: CHANCE_FINE,
                    });
                }
            }

            ChanceCard::NearestLandmark => {
                let from = self.players[idx].position.ok_or(GameError::NotStarted)?;
                if let Some(landmark) = Board::landmark_for_position(from) {
                    if self.board.get_tile(landmark).is_none() {
                        return Err(GameError::IllegalTileReference(landmark));
                    }
                    self.relocate(idx, from, landmark, events);
                    self.trigger_tile_action(idx, landmark, events)?;
                }
                // No bucket for this position: the card does nothing.
            }

            ChanceCard::CollectFromEach => {
                for payer in 0..self.players.len() {
                    if payer == idx || !self.players[payer].is_active() {
                        continue;
                    }
                    // A payer's shortfall bankrupts only that payer; the rest
                    // still pay.
                    if self.transfer(payer, idx, CHANCE_TRANSFER, events) {
                        events.push(GameEvent::MoneyTransferred {
                            from: self.players[payer].id,
                            to: player_id,
                            amount: CHANCE_TRANSFER,
                        });
                    }
                }
            }

            ChanceCard::PayEach => {
                for payee in 0..self.players.len() {
                    if payee == idx || !self.players[payee].is_active() {
                        continue;
                    }
                    if self.transfer(idx, payee, CHANCE_TRANSFER, events) {
                        events.push(GameEvent::MoneyTransferred {
                            from: player_id,
                            to: self.players[payee].id,
                            amount: CHANCE_TRANSFER,
                        });
                    } else {
                        // The payer is bankrupt; remaining payments lapse.
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    // ==================== Jail ====================

    fn jail_turn(&mut self, idx: usize, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let tile = self.players[idx].position.ok_or(GameError::NotStarted)?;
        self.jail_stay(idx, tile, events);
        Ok(())
    }

    fn jail_stay(&mut self, idx: usize, tile: TileId, events: &mut Vec<GameEvent>) {
        let player_id = self.players[idx].id;
        self.players[idx].jail_turns += 1;
        if self.players[idx].jail_turns >= JAIL_MAX_TURNS {
            self.release(idx, ReleaseReason::Served, events);
        } else {
            let request = DecisionRequest::JailChoice {
                player: player_id,
                tile,
                bail: JAIL_BAIL,
            };
            self.pending = Some(request.clone());
            events.push(GameEvent::DecisionRequested { request });
        }
    }

    fn release(&mut self, idx: usize, reason: ReleaseReason, events: &mut Vec<GameEvent>) {
        self.players[idx].jailed = false;
        self.players[idx].jail_turns = 0;
        events.push(GameEvent::PlayerReleased {
            player: self.players[idx].id,
            reason,
        });
    }

    fn attempt_jail_escape(
        &mut self,
        idx: usize,
        roll: DiceRoll,
        events: &mut Vec<GameEvent>,
    ) -> Result<(), GameError> {
        events.push(GameEvent::DiceRolled {
            player: self.players[idx].id,
            roll: roll.clone(),
        });
        if roll.is_doubles() {
            self.release(idx, ReleaseReason::Doubles, events);
            self.resolve_roll(idx, roll, events)?;
            // Leaving jail on doubles does not also earn an extra turn.
            self.extra_turn = false;
        }
        Ok(())
    }

    // ==================== Decision port ====================

    /// Answer an outstanding property-purchase request.
    pub fn resolve_property_purchase(
        &mut self,
        accept: bool,
    ) -> Result<Vec<GameEvent>, GameError> {
        let request =
            self.take_pending(|r| matches!(r, DecisionRequest::PropertyPurchase { .. }))?;
        let DecisionRequest::PropertyPurchase { player, tile, cost } = request else {
            return Err(GameError::DecisionMismatch);
        };
        let idx = player as usize;

        let mut events = Vec::new();
        if accept && self.players[idx].try_pay(cost) {
            self.board.set_property_owner(tile, Some(player));
            self.players[idx].owned.insert(tile);
            events.push(GameEvent::PropertyPurchased { player, tile, cost });
        } else {
            // Declined, or accepted without the funds to cover it.
            events.push(GameEvent::PurchaseDeclined { player, tile });
        }
        self.check_win(&mut events);
        self.notify(&events);
        Ok(events)
    }

    /// Answer an outstanding tax-choice request.
    pub fn resolve_tax_choice(&mut self, use_percent: bool) -> Result<Vec<GameEvent>, GameError> {
        let request = self.take_pending(|r| matches!(r, DecisionRequest::TaxChoice { .. }))?;
        let DecisionRequest::TaxChoice {
            player,
            tile,
            percent,
            fixed,
        } = request
        else {
            return Err(GameError::DecisionMismatch);
        };
        let idx = player as usize;

        let amount = if use_percent {
            self.players[idx].money * i64::from(percent) / 100
        } else {
            fixed
        };

        let mut events = Vec::new();
        if self.charge(idx, amount, &mut events) {
            events.push(GameEvent::TaxPaid {
                player,
                tile,
                amount,
            });
        }
        self.check_win(&mut events);
        self.notify(&events);
        Ok(events)
    }

    /// Answer an outstanding jail-choice request.
    pub fn resolve_jail_choice(&mut self, pay_bail: bool) -> Result<Vec<GameEvent>, GameError> {
        let request = self.take_pending(|r| matches!(r, DecisionRequest::JailChoice { .. }))?;
        let DecisionRequest::JailChoice { player, bail, .. } = request else {
            return Err(GameError::DecisionMismatch);
        };
        let idx = player as usize;

        let mut events = Vec::new();
        if pay_bail {
            if self.charge(idx, bail, &mut events) {
                self.release(idx, ReleaseReason::Bail, &mut events);
            }
        } else {
            let roll = self.dice.roll(&mut self.rng);
            self.attempt_jail_escape(idx, roll, &mut events)?;
        }
        self.check_win(&mut events);
        self.notify(&events);
        Ok(events)
    }

    fn take_pending<F>(&mut self, is_match: F) -> Result<DecisionRequest, GameError>
    where
        F: Fn(&DecisionRequest) -> bool,
    {
        let matched = match self.pending.as_ref() {
            None => return Err(GameError::NoPendingDecision),
            Some(request) => is_match(request),
        };
        if !matched {
            return Err(GameError::DecisionMismatch);
        }
        Ok(self.pending.take().unwrap())
    }

    // ==================== Money ====================

    /// Debit the payer and credit the payee. A shortfall runs the bankruptcy
    /// sequence on the payer and credits nothing.
    fn transfer(
        &mut self,
        payer: usize,
        payee: usize,
        amount: i64,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if self.players[payer].try_pay(amount) {
            self.players[payee].receive(amount);
            true
        } else {
            self.bankrupt_player(payer, events);
            false
        }
    }

    /// Debit the payer with no payee. A shortfall runs the bankruptcy
    /// sequence.
    fn charge(&mut self, idx: usize, amount: i64, events: &mut Vec<GameEvent>) -> bool {
        if self.players[idx].try_pay(amount) {
            true
        } else {
            self.bankrupt_player(idx, events);
            false
        }
    }

    fn bankrupt_player(&mut self, idx: usize, events: &mut Vec<GameEvent>) {
        let player = &mut self.players[idx];
        debug!(player = %player.name, "bankrupt");
        player.bankrupt = true;
        player.jailed = false;
        player.jail_turns = 0;
        player.skip_next_turn = false;
        player.free_parking = false;

        let holdings = std::mem::take(&mut player.owned);
        let player_id = player.id;
        for tile in holdings {
            self.board.set_property_owner(tile, None);
        }
        events.push(GameEvent::PlayerBankrupt { player: player_id });
    }

    // ==================== Win condition ====================

    fn check_win(&mut self, events: &mut Vec<GameEvent>) {
        if !matches!(self.phase, GamePhase::InProgress) {
            return;
        }

        let winner = if self.variant().is_property() {
            if self.players.len() > 1 {
                let mut active = self.players.iter().filter(|p| p.is_active());
                match (active.next(), active.next()) {
                    (Some(last), None) => Some(last.id),
                    _ => None,
                }
            } else {
                None
            }
        } else {
            let terminal = self.board.last_tile_id();
            self.players
                .iter()
                .find(|p| p.is_active() && p.position.is_some() && p.position == terminal)
                .map(|p| p.id)
        };

        if let Some(winner) = winner {
            self.phase = GamePhase::Over { winner };
            self.pending = None;
            debug!(winner, "game won");
            events.push(GameEvent::GameWon { player: winner });
        }
    }
}
