pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::fmt::Display;
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{
    alpha_beta, build_tree, compute_best_move, decide, evaluate, minimax, to_mermaid,
    AiDifficulty, Candidate, Node, SearchConfig, SearchDecision, SearchError, SearchStats, Turn,
};
pub use game::{
    generate_successors, legal_moves, Bag, Color, GameConfig, GameEvent, GameState,
    IntegrityError, Outcome, Player, Removal, RuleEngine, RuleError, RuleResolution, Score,
    Variant,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error<E: Serialize + Display>(error: E) -> JsValue {
    to_value(&error).unwrap_or_else(|_| JsValue::from_str(&error.to_string()))
}

fn serde_to_js_error<E: Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_variant(value: &str) -> Result<Variant, JsValue> {
    Variant::from_str(value).map_err(|_| {
        JsValue::from_str(&format!(
            "unknown variant {value:?}, expected standard or misere"
        ))
    })
}

fn parse_difficulty(value: Option<String>) -> Option<AiDifficulty> {
    value
        .as_deref()
        .and_then(|value| AiDifficulty::from_str(value).ok())
}

fn state_config(state: &GameState) -> Result<SearchConfig, JsValue> {
    SearchConfig::new(state.variant, i64::from(state.depth)).map_err(to_js_error)
}

fn search_config(variant: &str, depth: i32) -> Result<SearchConfig, JsValue> {
    let variant = parse_variant(variant)?;
    SearchConfig::new(variant, i64::from(depth)).map_err(to_js_error)
}

#[derive(Serialize)]
struct ComputerMoveResponse {
    decision: SearchDecision,
    applied: RuleResolution,
}

/// 浏览器端持有的一局游戏。
#[wasm_bindgen]
pub struct NimEngine {
    state: GameState,
}

#[wasm_bindgen]
impl NimEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<NimEngine, JsValue> {
        let state = if let Some(json) = config_json {
            let config: GameConfig = serde_json::from_str(&json).map_err(serde_to_js_error)?;
            GameState::new(config).map_err(to_js_error)?
        } else {
            GameState::sample()
        };
        Ok(NimEngine { state })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let state: GameState = serde_json::from_str(json).map_err(serde_to_js_error)?;
        state.integrity_check().map_err(to_js_error)?;
        self.state = state;
        Ok(())
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn outcome_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state.outcome()).map_err(serde_to_js_error)
    }

    pub fn play_human(&mut self, input: &str) -> Result<String, JsValue> {
        let removal = Removal::from_str(input).map_err(to_js_error)?;
        let events =
            RuleEngine::apply_human_move(&mut self.state, removal).map_err(to_js_error)?;
        serde_json::to_string(&RuleResolution::new(self.state.clone(), events))
            .map_err(serde_to_js_error)
    }

    pub fn play_computer(&mut self) -> Result<String, JsValue> {
        let (decision, events) =
            RuleEngine::apply_computer_move(&mut self.state).map_err(to_js_error)?;
        let response = ComputerMoveResponse {
            decision,
            applied: RuleResolution::new(self.state.clone(), events),
        };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// Runs the search without applying it, resolving after an optional delay.
    /// A difficulty preset, when given, replaces the session's depth for this search.
    pub fn think_computer(&self, delay_ms: Option<u32>, difficulty: Option<String>) -> Promise {
        let state = self.state.clone();
        let delay = delay_ms.unwrap_or(0);
        let difficulty = parse_difficulty(difficulty);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let config = state_config(&state)?.with_difficulty(difficulty);
            let decision = decide(state.bag, &config).map_err(to_js_error)?;
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    pub fn tree_diagram(&self) -> Result<String, JsValue> {
        let config = state_config(&self.state)?;
        Ok(to_mermaid(&build_tree(self.state.bag, &config)))
    }
}

/// 为给定局面计算电脑的最佳走法，返回走完后的袋子。
#[wasm_bindgen(js_name = "computeBestMove")]
pub fn compute_best_move_js(
    red: u32,
    blue: u32,
    variant: &str,
    depth: i32,
) -> Result<JsValue, JsValue> {
    let variant = parse_variant(variant)?;
    let chosen =
        compute_best_move(Bag::new(red, blue), variant, i64::from(depth)).map_err(to_js_error)?;
    to_value(&chosen).map_err(JsValue::from)
}

/// 返回完整的搜索决策（候选走法、评估值、节点统计）。
#[wasm_bindgen(js_name = "searchDecision")]
pub fn search_decision(
    red: u32,
    blue: u32,
    variant: &str,
    depth: i32,
) -> Result<JsValue, JsValue> {
    let config = search_config(variant, depth)?;
    let decision = decide(Bag::new(red, blue), &config).map_err(to_js_error)?;
    to_value(&decision).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    red: u32,
    blue: u32,
    variant: &str,
    difficulty: Option<String>,
) -> Result<JsValue, JsValue> {
    let variant = parse_variant(variant)?;
    let difficulty = parse_difficulty(difficulty).unwrap_or(AiDifficulty::Normal);
    let config = SearchConfig::from_difficulty(variant, difficulty);
    let decision = decide(Bag::new(red, blue), &config).map_err(to_js_error)?;
    to_value(&decision).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "searchTreeDiagram")]
pub fn search_tree_diagram(
    red: u32,
    blue: u32,
    variant: &str,
    depth: i32,
) -> Result<String, JsValue> {
    let config = search_config(variant, depth)?;
    Ok(to_mermaid(&build_tree(Bag::new(red, blue), &config)))
}

#[wasm_bindgen(js_name = "parseMove")]
pub fn parse_move(input: &str) -> Result<JsValue, JsValue> {
    let removal = Removal::from_str(input).map_err(to_js_error)?;
    to_value(&removal).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "createGameState")]
pub fn create_game_state(config: JsValue) -> Result<JsValue, JsValue> {
    let config: GameConfig = from_value(config).map_err(JsValue::from)?;
    let state = GameState::new(config).map_err(to_js_error)?;
    to_value(&state).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "checkOutcome")]
pub fn check_outcome(state: JsValue) -> Result<JsValue, JsValue> {
    let state: GameState = from_value(state).map_err(JsValue::from)?;
    to_value(&RuleEngine::check_outcome(&state)).map_err(JsValue::from)
}
