//! Integration tests for the Meander game engine.
//!
//! These tests verify complete game flows through the public API: scripted
//! races, property trading, jail sequences, and save/load round trips.

use meander_core::*;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

fn roll(values: &[u8]) -> DiceRoll {
    DiceRoll::new(values.to_vec())
}

fn temp_dir(test: &str) -> PathBuf {
    let dir =
        std::env::temp_dir().join(format!("meander-it-{}-{}", test, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Decline any purchase decision left pending after a move.
fn decline_pending(game: &mut Game) {
    if matches!(
        game.pending_decision(),
        Some(DecisionRequest::PropertyPurchase { .. })
    ) {
        game.resolve_property_purchase(false).unwrap();
    }
}

#[test]
fn test_scripted_race_to_victory() {
    let mut game = Game::new(BoardVariant::RaceClassic);
    game.add_player("Alice").unwrap();
    game.start().unwrap();

    // A route that dodges every ladder, wait, and back-to-start tile.
    let route: &[u8] = &[
        4, 4, 5, 6, 5, 5, 5, 4, 4, 4, 3, 3, 3, 3, 5, 5, 5, 6, 3, 3, 2,
    ];
    for &step in route {
        game.process_turn_with_roll(roll(&[step])).unwrap();
        assert!(!game.is_over());
    }
    assert_eq!(game.players()[0].position, Some(88));

    // Rolling past the terminal clamps onto it and wins.
    let events = game.process_turn_with_roll(roll(&[5])).unwrap();
    assert_eq!(game.players()[0].position, Some(90));
    assert_eq!(game.winner(), Some(0));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::GameWon { player: 0 })));
}

#[test]
fn test_race_game_runs_without_panic() {
    // Random rolls across all three layouts; the engine never wedges.
    for variant in [
        BoardVariant::RaceClassic,
        BoardVariant::RaceBoosted,
        BoardVariant::RaceTreacherous,
    ] {
        let mut game = Game::new(variant);
        game.add_player("Alice").unwrap();
        game.add_player("Bob").unwrap();
        game.start().unwrap();

        let mut iterations = 0;
        while !game.is_over() && iterations < 500 {
            game.process_turn().unwrap();
            if game.is_over() {
                break;
            }
            game.advance_to_next_player().unwrap();
            iterations += 1;
        }
        assert!(iterations > 0, "game should have run some turns");
    }
}

#[test]
fn test_purchase_then_rent_flow() {
    let mut game = Game::new(BoardVariant::Property);
    game.add_player("Alice").unwrap();
    game.add_player("Bob").unwrap();
    game.start().unwrap();

    // Alice buys Harbor Walk.
    game.process_turn_with_roll(roll(&[1, 2])).unwrap();
    game.resolve_property_purchase(true).unwrap();
    assert_eq!(game.players()[0].money, STARTING_MONEY - 100);
    game.advance_to_next_player().unwrap();

    // Bob lands on it and pays rent.
    let events = game.process_turn_with_roll(roll(&[1, 2])).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::RentPaid {
            player: 1,
            owner: 0,
            tile: 4,
            amount: 20
        }
    )));
    assert_eq!(game.players()[0].money, STARTING_MONEY - 100 + 20);
    assert_eq!(game.players()[1].money, STARTING_MONEY - 20);

    let events = game.advance_to_next_player().unwrap();
    assert!(events.contains(&GameEvent::CurrentPlayerChanged { player: 0 }));
}

#[test]
fn test_jail_flow_through_public_api() {
    let mut game = Game::new(BoardVariant::Property);
    game.add_player("Alice").unwrap();
    game.add_player("Bob").unwrap();
    game.start().unwrap();

    // Alice rides doubles (keeping her turn) out to the go-to-jail tile.
    for step in [roll(&[6, 6]), roll(&[6, 6])] {
        game.process_turn_with_roll(step).unwrap();
        decline_pending(&mut game);
        game.advance_to_next_player().unwrap();
        assert_eq!(game.active_player().unwrap().id, 0, "doubles keep the turn");
    }
    let events = game.process_turn_with_roll(roll(&[3, 3])).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::PlayerJailed {
            player: 0,
            jail_tile: 11
        }
    )));
    let alice = &game.players()[0];
    assert_eq!(alice.position, Some(11));
    assert!(alice.jailed && alice.skip_next_turn);

    // Being jailed forfeits the doubles bonus: the turn passes to Bob.
    game.advance_to_next_player().unwrap();
    assert_eq!(game.active_player().unwrap().id, 1);
    game.process_turn_with_roll(roll(&[2, 3])).unwrap();
    decline_pending(&mut game);
    game.advance_to_next_player().unwrap();

    // Alice's first turn after the arrest is skipped.
    let events = game.process_turn().unwrap();
    assert_eq!(events, vec![GameEvent::TurnSkipped { player: 0 }]);
    game.advance_to_next_player().unwrap();
    game.process_turn_with_roll(roll(&[1, 3])).unwrap();
    decline_pending(&mut game);
    game.advance_to_next_player().unwrap();

    // Now the jail tile offers bail or a doubles attempt; Alice pays.
    game.process_turn().unwrap();
    assert!(matches!(
        game.pending_decision(),
        Some(DecisionRequest::JailChoice { player: 0, .. })
    ));
    let events = game.resolve_jail_choice(true).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::PlayerReleased {
            player: 0,
            reason: ReleaseReason::Bail
        }
    )));
    assert!(!game.players()[0].jailed);
    assert_eq!(game.players()[0].money, STARTING_MONEY - 50);
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = temp_dir("save-load");
    let mut game = Game::new(BoardVariant::Property);
    game.add_player("Alice").unwrap();
    game.add_player("Bob").unwrap();
    game.start().unwrap();

    // Alice buys tile 4, then Bob becomes the current player.
    game.process_turn_with_roll(roll(&[1, 2])).unwrap();
    game.resolve_property_purchase(true).unwrap();
    game.advance_to_next_player().unwrap();
    game.save(&dir, "slot1").unwrap();

    let mut loaded = Game::load(&dir, BoardVariant::Property, "slot1").unwrap();
    assert_eq!(loaded.phase(), GamePhase::NotStarted);
    loaded.start().unwrap();

    // Roster, funds, positions, holdings, and the current player survive.
    assert_eq!(loaded.players().len(), 2);
    assert_eq!(loaded.players()[0].name, "Alice");
    assert_eq!(loaded.players()[0].money, STARTING_MONEY - 100);
    assert_eq!(loaded.players()[0].position, Some(4));
    assert!(loaded.players()[0].owned.contains(&4));
    assert_eq!(loaded.players()[1].position, Some(1));
    assert_eq!(loaded.active_player().unwrap().name, "Bob");

    // Ownership was resolved back onto the board: Bob pays rent on landing.
    let events = loaded.process_turn_with_roll(roll(&[1, 2])).unwrap();
    assert!(events.iter().any(|e| matches!(
        e,
        GameEvent::RentPaid {
            player: 1,
            owner: 0,
            ..
        }
    )));
}

#[test]
fn test_load_failure_leaves_session_untouched() {
    let dir = temp_dir("load-failure");
    let mut game = Game::new(BoardVariant::Property);
    game.add_player("Alice").unwrap();
    game.add_player("Bob").unwrap();
    game.start().unwrap();
    game.process_turn_with_roll(roll(&[1, 2])).unwrap();
    game.resolve_property_purchase(true).unwrap();

    let before_money = game.players()[0].money;
    assert!(load_game(&dir, BoardVariant::Property, "missing").is_err());

    // The failed load had no effect on the running session.
    assert_eq!(game.players()[0].money, before_money);
    assert_eq!(game.phase(), GamePhase::InProgress);
    game.advance_to_next_player().unwrap();
}

#[test]
fn test_save_before_start_round_trips_roster() {
    let dir = temp_dir("save-fresh");
    let mut game = Game::new(BoardVariant::RaceClassic);
    game.add_player("Alice").unwrap();
    game.add_player("Bob").unwrap();
    game.save(&dir, "fresh").unwrap();

    let mut loaded = Game::load(&dir, BoardVariant::RaceClassic, "fresh").unwrap();
    assert_eq!(loaded.players().len(), 2);
    assert_eq!(loaded.players()[0].position, None);

    loaded.start().unwrap();
    assert_eq!(loaded.players()[0].position, Some(1));
}

#[test]
fn test_observer_sees_full_turn_in_order() {
    let mut game = Game::new(BoardVariant::Property);
    game.add_player("Alice").unwrap();
    game.add_player("Bob").unwrap();

    let log: Rc<RefCell<Vec<GameEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let id = game.subscribe(Rc::new(move |event: &GameEvent| {
        sink.borrow_mut().push(event.clone());
    }));

    game.start().unwrap();
    let turn_events = game.process_turn_with_roll(roll(&[1, 2])).unwrap();

    let seen = log.borrow().clone();
    assert_eq!(seen[0], GameEvent::CurrentPlayerChanged { player: 0 });
    assert_eq!(&seen[1..], &turn_events[..]);

    // After unsubscribing nothing more arrives.
    assert!(game.unsubscribe(id));
    let len_before = log.borrow().len();
    game.resolve_property_purchase(false).unwrap();
    assert_eq!(log.borrow().len(), len_before);
}

#[test]
fn test_roster_validation_through_public_api() {
    let mut game = Game::new(BoardVariant::Property);
    game.add_player("Alice").unwrap();
    assert!(game.add_player("Alice").is_err());
    assert!(game.add_player("").is_err());
    game.start().unwrap();
    assert_eq!(game.add_player("Bob"), Err(GameError::AlreadyStarted));
}
