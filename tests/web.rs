//! Tests for the JS surface; run with `wasm-pack test --node`.
#![cfg(target_arch = "wasm32")]

use red_blue_nim::{
    compute_ai_move, compute_best_move_js, parse_move, Bag, Color, NimEngine, Removal,
    SearchDecision,
};
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn compute_best_move_returns_successor_bag() {
    let value = compute_best_move_js(1, 1, "standard", 1).expect("search should succeed");
    let bag: Bag = serde_wasm_bindgen::from_value(value).expect("bag should deserialize");
    assert_eq!(bag, Bag::new(0, 1));
}

#[wasm_bindgen_test]
fn compute_best_move_rejects_empty_bag_and_bad_variant() {
    assert!(compute_best_move_js(0, 0, "standard", 3).is_err());
    assert!(compute_best_move_js(3, 3, "classic", 3).is_err());
    assert!(compute_best_move_js(3, 3, "misere", 0).is_err());
}

#[wasm_bindgen_test]
fn compute_ai_move_uses_difficulty_preset() {
    let value = compute_ai_move(4, 4, "standard", Some("expert".to_string()))
        .expect("search should succeed");
    let decision: SearchDecision =
        serde_wasm_bindgen::from_value(value).expect("decision should deserialize");
    assert_eq!(decision.depth, 8);

    // Unknown names fall back to the normal preset.
    let value = compute_ai_move(4, 4, "standard", Some("godlike".to_string()))
        .expect("search should succeed");
    let decision: SearchDecision =
        serde_wasm_bindgen::from_value(value).expect("decision should deserialize");
    assert_eq!(decision.depth, 3);
}

#[wasm_bindgen_test]
fn parse_move_reads_notation() {
    let value = parse_move("2b").expect("move should parse");
    let removal: Removal =
        serde_wasm_bindgen::from_value(value).expect("removal should deserialize");
    assert_eq!(removal, Removal::new(Color::Blue, 2));
    assert!(parse_move("5r").is_err());
}

#[wasm_bindgen_test]
fn engine_plays_a_full_game() {
    let config = r#"{"red":3,"blue":4,"variant":"misere","firstPlayer":"human","depth":4}"#;
    let mut engine = NimEngine::new(Some(config.to_string())).expect("config should be valid");

    while !engine.is_over() {
        if engine.play_human("1R").is_err() {
            engine.play_human("1B").expect("one of the colours has marbles left");
        }
        if !engine.is_over() {
            engine.play_computer().expect("computer should move");
        }
    }

    let outcome = engine.outcome_json().expect("outcome should serialize");
    assert!(outcome.contains("winner"));
}
