use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ai::AiDifficulty;

/// 局面分值，红球 2 分、蓝球 3 分。
pub type Score = i64;

const RED_VALUE: Score = 2;
const BLUE_VALUE: Score = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
}

impl Color {
    pub fn symbol(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("red"),
            Color::Blue => f.write_str("blue"),
        }
    }
}

/// 袋中剩余的红、蓝弹珠，即一个局面。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Bag {
    pub red: u32,
    pub blue: u32,
}

impl Bag {
    pub const fn new(red: u32, blue: u32) -> Self {
        Self { red, blue }
    }

    /// No marbles of either colour left: nothing can be generated from here.
    pub fn is_empty(&self) -> bool {
        self.red == 0 && self.blue == 0
    }

    /// One colour has run out, which ends the game.
    pub fn is_exhausted(&self) -> bool {
        self.red == 0 || self.blue == 0
    }

    pub fn count(&self, color: Color) -> u32 {
        match color {
            Color::Red => self.red,
            Color::Blue => self.blue,
        }
    }

    pub fn remove(&self, color: Color, count: u32) -> Option<Bag> {
        match color {
            Color::Red => self.red.checked_sub(count).map(|red| Bag::new(red, self.blue)),
            Color::Blue => self.blue.checked_sub(count).map(|blue| Bag::new(self.red, blue)),
        }
    }

    pub fn total(&self) -> u32 {
        self.red.saturating_add(self.blue)
    }

    pub fn score(&self) -> Score {
        Score::from(self.red) * RED_VALUE + Score::from(self.blue) * BLUE_VALUE
    }
}

impl fmt::Display for Bag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.red, self.blue)
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Standard,
    #[serde(alias = "misère")]
    Misere,
}

impl FromStr for Variant {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Variant::Standard),
            "misere" | "misère" => Ok(Variant::Misere),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Standard => f.write_str("standard"),
            Variant::Misere => f.write_str("misere"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Human,
    #[default]
    Computer,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::Human => Player::Computer,
            Player::Computer => Player::Human,
        }
    }
}

impl FromStr for Player {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "human" => Ok(Player::Human),
            "computer" | "bot" => Ok(Player::Computer),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Human => f.write_str("human"),
            Player::Computer => f.write_str("computer"),
        }
    }
}

/// 开局参数，通常由前端以 JSON 形式传入。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub red: u32,
    pub blue: u32,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub first_player: Player,
    /// Explicit ply count; takes precedence over `difficulty`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<AiDifficulty>,
}

impl GameConfig {
    pub fn search_depth(&self) -> i64 {
        self.depth.unwrap_or_else(|| {
            i64::from(self.difficulty.unwrap_or(AiDifficulty::Normal).depth())
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum IntegrityError {
    InvalidDepth { depth: i64 },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityError::InvalidDepth { depth } => {
                write!(f, "search depth must be a positive ply count, got {depth}")
            }
        }
    }
}

impl std::error::Error for IntegrityError {}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub winner: Player,
    pub final_bag: Bag,
    pub final_score: Score,
}

/// 一局游戏的整体状态。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub bag: Bag,
    pub variant: Variant,
    pub depth: u32,
    pub current_turn: Player,
    pub first_player: Player,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, IntegrityError> {
        let requested = config.search_depth();
        let depth = u32::try_from(requested)
            .ok()
            .filter(|depth| *depth > 0)
            .ok_or(IntegrityError::InvalidDepth { depth: requested })?;

        Ok(Self {
            bag: Bag::new(config.red, config.blue),
            variant: config.variant,
            depth,
            current_turn: config.first_player,
            first_player: config.first_player,
        })
    }

    pub fn sample() -> Self {
        Self {
            bag: Bag::new(5, 5),
            variant: Variant::Standard,
            depth: 4,
            current_turn: Player::Computer,
            first_player: Player::Computer,
        }
    }

    pub fn is_over(&self) -> bool {
        self.bag.is_exhausted()
    }

    /// 游戏结束时给出胜者与终局得分。
    ///
    /// Standard: whoever empties a colour loses, so the player now on turn
    /// wins. Misère: whoever empties a colour wins.
    pub fn outcome(&self) -> Option<Outcome> {
        if !self.is_over() {
            return None;
        }

        let winner = match self.variant {
            Variant::Standard => self.current_turn,
            Variant::Misere => self.current_turn.other(),
        };

        Some(Outcome {
            winner,
            final_bag: self.bag,
            final_score: self.bag.score(),
        })
    }

    pub fn integrity_check(&self) -> Result<(), IntegrityError> {
        if self.depth == 0 {
            return Err(IntegrityError::InvalidDepth { depth: 0 });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(red: u32, blue: u32, variant: Variant, first_player: Player) -> GameConfig {
        GameConfig {
            red,
            blue,
            variant,
            first_player,
            depth: Some(3),
            difficulty: None,
        }
    }

    #[test]
    fn bag_score_weights_blue_higher() {
        assert_eq!(Bag::new(0, 3).score(), 9);
        assert_eq!(Bag::new(4, 0).score(), 8);
        assert_eq!(Bag::new(2, 5).score(), 19);
    }

    #[test]
    fn bag_remove_never_underflows() {
        let bag = Bag::new(1, 2);
        assert_eq!(bag.remove(Color::Red, 1), Some(Bag::new(0, 2)));
        assert_eq!(bag.remove(Color::Red, 2), None);
        assert_eq!(bag.remove(Color::Blue, 2), Some(Bag::new(1, 0)));
    }

    #[test]
    fn variant_and_player_parse_command_line_spellings() {
        assert_eq!("standard".parse::<Variant>(), Ok(Variant::Standard));
        assert_eq!("Misere".parse::<Variant>(), Ok(Variant::Misere));
        assert_eq!("misère".parse::<Variant>(), Ok(Variant::Misere));
        assert!("classic".parse::<Variant>().is_err());
        assert_eq!("HUMAN".parse::<Player>(), Ok(Player::Human));
        assert_eq!("computer".parse::<Player>(), Ok(Player::Computer));
    }

    #[test]
    fn config_with_non_positive_depth_is_rejected() {
        let mut cfg = config(3, 3, Variant::Standard, Player::Human);
        cfg.depth = Some(0);
        assert_eq!(
            GameState::new(cfg.clone()),
            Err(IntegrityError::InvalidDepth { depth: 0 })
        );
        cfg.depth = Some(-2);
        assert_eq!(
            GameState::new(cfg),
            Err(IntegrityError::InvalidDepth { depth: -2 })
        );
    }

    #[test]
    fn config_deserializes_from_camel_case_json() {
        let cfg: GameConfig = serde_json::from_str(
            r#"{"red":4,"blue":6,"variant":"misere","firstPlayer":"human","depth":5}"#,
        )
        .expect("config should parse");
        let state = GameState::new(cfg).expect("config should be valid");
        assert_eq!(state.bag, Bag::new(4, 6));
        assert_eq!(state.variant, Variant::Misere);
        assert_eq!(state.current_turn, Player::Human);
        assert_eq!(state.depth, 5);
    }

    #[test]
    fn difficulty_preset_fills_in_missing_depth() {
        let cfg: GameConfig = serde_json::from_str(r#"{"red":4,"blue":6,"difficulty":"hard"}"#)
            .expect("config should parse");
        let state = GameState::new(cfg).expect("config should be valid");
        assert_eq!(state.depth, AiDifficulty::Hard.depth());

        let cfg: GameConfig = serde_json::from_str(r#"{"red":4,"blue":6}"#)
            .expect("config should parse");
        let state = GameState::new(cfg).expect("config should be valid");
        assert_eq!(state.depth, AiDifficulty::Normal.depth());
    }

    #[test]
    fn explicit_depth_overrides_difficulty() {
        let mut cfg = config(4, 6, Variant::Standard, Player::Human);
        cfg.depth = Some(2);
        cfg.difficulty = Some(AiDifficulty::Expert);
        let state = GameState::new(cfg).expect("config should be valid");
        assert_eq!(state.depth, 2);
    }

    #[test]
    fn score_of_largest_bag_stays_inside_sentinels() {
        let score = Bag::new(u32::MAX, u32::MAX).score();
        assert_eq!(score, 5 * Score::from(u32::MAX));
        assert!(-score > Score::MIN && score < Score::MAX);
    }

    #[test]
    fn standard_winner_is_player_on_turn_after_exhaustion() {
        let mut state = GameState::new(config(0, 3, Variant::Standard, Player::Human))
            .expect("valid config");
        state.current_turn = Player::Human;
        let outcome = state.outcome().expect("game should be over");
        assert_eq!(outcome.winner, Player::Human);
        assert_eq!(outcome.final_score, 9);
    }

    #[test]
    fn misere_winner_is_player_who_emptied_a_colour() {
        let mut state = GameState::new(config(2, 0, Variant::Misere, Player::Human))
            .expect("valid config");
        state.current_turn = Player::Human;
        let outcome = state.outcome().expect("game should be over");
        assert_eq!(outcome.winner, Player::Computer);
        assert_eq!(outcome.final_score, 4);
    }

    #[test]
    fn running_game_has_no_outcome() {
        assert!(GameState::sample().outcome().is_none());
    }
}
