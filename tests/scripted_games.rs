//! Scripted game replays.
//!
//! Each script is a JSON document holding a command sequence plus the
//! expected end state, deserialized with serde and driven through
//! `Command` dispatch - the same write path a UI collaborator uses.

use quoridor_core::{Command, MatchState};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Script {
    description: String,
    players: usize,
    commands: Vec<Command>,
    expected: Expected,
}

#[derive(Debug, Deserialize)]
struct Expected {
    winner: Option<u8>,
    active_player: usize,
    fences_available: Vec<u8>,
    history_len: usize,
}

fn replay(json: &str) -> (Script, MatchState) {
    let script: Script = serde_json::from_str(json).expect("script must parse");
    let mut state = MatchState::new(script.players);
    for &command in &script.commands {
        state.apply(command);
    }
    (script, state)
}

fn check_expectations(script: &Script, state: &MatchState) {
    assert_eq!(state.winner(), script.expected.winner, "{}", script.description);
    assert_eq!(
        state.active_player, script.expected.active_player,
        "{}",
        script.description
    );
    assert_eq!(
        state.fences.available, script.expected.fences_available,
        "{}",
        script.description
    );
    assert_eq!(
        state.history_len(),
        script.expected.history_len,
        "{}",
        script.description
    );
}

/// A full 2-player race down the middle, including the jump over the
/// opposing pawn when the two meet. Player 1 jumps first and wins the race
/// by one tempo.
const PAWN_RACE: &str = r#"{
    "description": "2-player pawn race with a jump in the middle",
    "players": 2,
    "commands": [
        {"Move": {"to": 13}},
        {"Move": {"to": 67}},
        {"Move": {"to": 22}},
        {"Move": {"to": 58}},
        {"Move": {"to": 31}},
        {"Move": {"to": 49}},
        {"Move": {"to": 40}},
        {"Move": {"to": 31}},
        {"Move": {"to": 49}},
        {"Move": {"to": 22}},
        {"Move": {"to": 58}},
        {"Move": {"to": 13}},
        {"Move": {"to": 67}},
        {"Move": {"to": 4}}
    ],
    "expected": {
        "winner": 2,
        "active_player": 0,
        "fences_available": [10, 10],
        "history_len": 14
    }
}"#;

/// Fence placements mixed with undo/redo. The undo must refund the fence
/// and restore the cut edges; the redo must spend it again.
const FENCES_AND_UNDO: &str = r#"{
    "description": "fence placements with an undo/redo round trip",
    "players": 2,
    "commands": [
        {"PlaceHorizontalFence": {"position": 30}},
        {"PlaceVerticalFence": {"position": 50}},
        "Undo",
        "Redo",
        {"Move": {"to": 13}}
    ],
    "expected": {
        "winner": null,
        "active_player": 1,
        "fences_available": [9, 9],
        "history_len": 3
    }
}"#;

/// Four seats taking one turn each, then a fence from seat 0.
const FOUR_PLAYER_ROUND: &str = r#"{
    "description": "4-player round with one fence",
    "players": 4,
    "commands": [
        {"Move": {"to": 13}},
        {"Move": {"to": 43}},
        {"Move": {"to": 67}},
        {"Move": {"to": 37}},
        {"PlaceHorizontalFence": {"position": 60}}
    ],
    "expected": {
        "winner": null,
        "active_player": 1,
        "fences_available": [4, 5, 5, 5],
        "history_len": 5
    }
}"#;

#[test]
fn pawn_race_produces_a_winner() {
    let (script, state) = replay(PAWN_RACE);
    check_expectations(&script, &state);
    assert_eq!(state.player_positions, vec![67, 4]);
}

#[test]
fn fence_round_trip_keeps_books_consistent() {
    let (script, state) = replay(FENCES_AND_UNDO);
    check_expectations(&script, &state);
    assert_eq!(state.fences.positions.horizontal, vec![30]);
    assert_eq!(state.fences.positions.vertical, vec![50]);
    assert!(!state.graph.connected(30, 39));
    assert!(!state.graph.connected(31, 40));
    assert!(!state.graph.connected(50, 51));
    assert!(!state.graph.connected(59, 60));
}

#[test]
fn four_player_round_cycles_all_seats() {
    let (script, state) = replay(FOUR_PLAYER_ROUND);
    check_expectations(&script, &state);
    assert_eq!(state.player_positions, vec![13, 43, 67, 37]);
    assert!(!state.graph.connected(60, 69));
}

#[test]
fn undoing_an_entire_script_restores_the_initial_state() {
    let (_, mut state) = replay(FENCES_AND_UNDO);
    while state.undo() {}
    assert_eq!(state.snapshot(), MatchState::new(2).snapshot());
}
