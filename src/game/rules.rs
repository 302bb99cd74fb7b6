use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::state::{Bag, Color, GameState, IntegrityError, Outcome, Player, Score, Variant};
use crate::ai::{self, SearchConfig, SearchDecision, SearchError};

static STANDARD_ORDER: [Removal; 4] = [
    Removal::new(Color::Red, 2),
    Removal::new(Color::Blue, 2),
    Removal::new(Color::Red, 1),
    Removal::new(Color::Blue, 1),
];

static MISERE_ORDER: [Removal; 4] = [
    Removal::new(Color::Blue, 1),
    Removal::new(Color::Red, 1),
    Removal::new(Color::Blue, 2),
    Removal::new(Color::Red, 2),
];

/// 一步操作：从某种颜色中取走 1 或 2 颗弹珠。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Removal {
    pub color: Color,
    pub count: u32,
}

impl Removal {
    pub const fn new(color: Color, count: u32) -> Self {
        Self { color, count }
    }

    /// Recovers the removal that turns `from` into `to`, if it is a single legal move.
    pub fn between(from: Bag, to: Bag) -> Option<Removal> {
        let removal = match (from.red.checked_sub(to.red)?, from.blue.checked_sub(to.blue)?) {
            (count, 0) if count > 0 => Removal::new(Color::Red, count),
            (0, count) if count > 0 => Removal::new(Color::Blue, count),
            _ => return None,
        };
        matches!(removal.count, 1 | 2).then_some(removal)
    }
}

impl fmt::Display for Removal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.color.symbol())
    }
}

impl FromStr for Removal {
    type Err = RuleError;

    /// Parses `<n><R|B>`, e.g. `2R`, ` 1b ` or `1 R`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_uppercase();
        let invalid = || RuleError::InvalidMoveFormat {
            input: s.to_string(),
        };

        let color = match input.chars().last() {
            Some('R') => Color::Red,
            Some('B') => Color::Blue,
            _ => return Err(invalid()),
        };
        let count: u32 = input[..input.len() - 1]
            .trim()
            .parse()
            .map_err(|_| invalid())?;
        if !matches!(count, 1 | 2) {
            return Err(RuleError::InvalidRemoval { count });
        }
        Ok(Removal::new(color, count))
    }
}

/// 按变体的固定顺序返回四个候选走法。
pub fn move_order(variant: Variant) -> &'static [Removal; 4] {
    match variant {
        Variant::Standard => &STANDARD_ORDER,
        Variant::Misere => &MISERE_ORDER,
    }
}

/// Legal removals from `bag` paired with the bags they lead to, in search order.
pub fn legal_moves(bag: Bag, variant: Variant) -> Vec<(Removal, Bag)> {
    if bag.is_empty() {
        return Vec::new();
    }

    move_order(variant)
        .iter()
        .filter_map(|removal| {
            let next = bag.remove(removal.color, removal.count)?;
            debug_assert_eq!(
                Removal::between(bag, next),
                Some(*removal),
                "successor of {bag} must drop exactly {removal}"
            );
            Some((*removal, next))
        })
        .collect()
}

pub fn generate_successors(bag: Bag, variant: Variant) -> Vec<Bag> {
    legal_moves(bag, variant)
        .into_iter()
        .map(|(_, next)| next)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    GameFinished,
    NotPlayerTurn {
        current: Player,
    },
    InvalidMoveFormat {
        input: String,
    },
    InvalidRemoval {
        count: u32,
    },
    InsufficientMarbles {
        color: Color,
        requested: u32,
        available: u32,
    },
    Search {
        error: SearchError,
    },
    IntegrityViolation {
        error: IntegrityError,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::GameFinished => f.write_str("the game is already over"),
            RuleError::NotPlayerTurn { current } => write!(f, "it is the {current}'s turn"),
            RuleError::InvalidMoveFormat { input } => {
                write!(f, "invalid move {input:?}, expected <num>(R/B)")
            }
            RuleError::InvalidRemoval { count } => {
                write!(f, "can only remove 1 or 2 marbles, not {count}")
            }
            RuleError::InsufficientMarbles {
                color,
                requested,
                available,
            } => write!(
                f,
                "cannot remove {requested} {color} marbles, only {available} left"
            ),
            RuleError::Search { error } => write!(f, "search failed: {error}"),
            RuleError::IntegrityViolation { error } => write!(f, "corrupt game state: {error}"),
        }
    }
}

impl std::error::Error for RuleError {}

impl From<SearchError> for RuleError {
    fn from(error: SearchError) -> Self {
        RuleError::Search { error }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MarblesRemoved {
        player: Player,
        removal: Removal,
        bag: Bag,
    },
    GameOver {
        winner: Player,
        final_score: Score,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

impl RuleResolution {
    pub fn new(state: GameState, mut events: Vec<GameEvent>) -> Self {
        let outcome = state.outcome();
        if let Some(outcome) = outcome {
            let has_event = events
                .iter()
                .any(|event| matches!(event, GameEvent::GameOver { .. }));
            if !has_event {
                events.push(GameEvent::GameOver {
                    winner: outcome.winner,
                    final_score: outcome.final_score,
                });
            }
        }

        Self {
            state,
            events,
            outcome,
        }
    }
}

pub struct RuleEngine;

impl RuleEngine {
    fn ensure_playable(state: &GameState, player: Player) -> Result<(), RuleError> {
        state
            .integrity_check()
            .map_err(|error| RuleError::IntegrityViolation { error })?;
        if state.is_over() {
            return Err(RuleError::GameFinished);
        }
        if state.current_turn != player {
            return Err(RuleError::NotPlayerTurn {
                current: state.current_turn,
            });
        }
        Ok(())
    }

    fn commit(state: &mut GameState, player: Player, removal: Removal, bag: Bag) -> Vec<GameEvent> {
        state.bag = bag;
        state.current_turn = player.other();

        let mut events = vec![GameEvent::MarblesRemoved {
            player,
            removal,
            bag,
        }];
        if let Some(outcome) = state.outcome() {
            events.push(GameEvent::GameOver {
                winner: outcome.winner,
                final_score: outcome.final_score,
            });
        }
        events
    }

    pub fn apply_human_move(
        state: &mut GameState,
        removal: Removal,
    ) -> Result<Vec<GameEvent>, RuleError> {
        Self::ensure_playable(state, Player::Human)?;

        if !matches!(removal.count, 1 | 2) {
            return Err(RuleError::InvalidRemoval {
                count: removal.count,
            });
        }
        let available = state.bag.count(removal.color);
        let next = state
            .bag
            .remove(removal.color, removal.count)
            .ok_or(RuleError::InsufficientMarbles {
                color: removal.color,
                requested: removal.count,
                available,
            })?;

        Ok(Self::commit(state, Player::Human, removal, next))
    }

    pub fn apply_computer_move(
        state: &mut GameState,
    ) -> Result<(SearchDecision, Vec<GameEvent>), RuleError> {
        Self::ensure_playable(state, Player::Computer)?;

        let config = SearchConfig::new(state.variant, i64::from(state.depth))?;
        let decision = ai::decide(state.bag, &config)?;
        let events = Self::commit(state, Player::Computer, decision.removal, decision.chosen);
        Ok((decision, events))
    }

    pub fn check_outcome(state: &GameState) -> Option<Outcome> {
        state.outcome()
    }
}
