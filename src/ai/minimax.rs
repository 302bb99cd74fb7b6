use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::tree::{build_tree_with_stats, Node, Turn};
use crate::game::{Bag, Removal, Score, Variant};
use crate::{console_log, console_warn};

/// Lower bound outside any reachable score.
pub const NEG_INFINITY: Score = Score::MIN;
/// Upper bound outside any reachable score.
pub const POS_INFINITY: Score = Score::MAX;

/// Trees grow roughly as 4^plies; past this the search gets slow enough to notice.
const DEEP_SEARCH_WARNING_PLIES: u32 = 12;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AiDifficulty {
    Easy,
    Normal,
    Hard,
    Expert,
}

impl AiDifficulty {
    pub fn depth(self) -> u32 {
        match self {
            AiDifficulty::Easy => 1,
            AiDifficulty::Normal => 3,
            AiDifficulty::Hard => 5,
            AiDifficulty::Expert => 8,
        }
    }
}

impl FromStr for AiDifficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiDifficulty::Easy),
            "normal" | "medium" => Ok(AiDifficulty::Normal),
            "hard" => Ok(AiDifficulty::Hard),
            "expert" | "extreme" => Ok(AiDifficulty::Expert),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SearchError {
    InvalidDepth { depth: i64 },
    NoLegalMove { bag: Bag },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidDepth { depth } => {
                write!(f, "search depth must be a positive ply count, got {depth}")
            }
            SearchError::NoLegalMove { bag } => write!(f, "no legal move from bag {bag}"),
        }
    }
}

impl std::error::Error for SearchError {}

/// 单次搜索的只读参数。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    pub variant: Variant,
    pub depth: u32,
}

impl SearchConfig {
    pub fn new(variant: Variant, depth: i64) -> Result<Self, SearchError> {
        let depth = u32::try_from(depth)
            .ok()
            .filter(|depth| *depth > 0)
            .ok_or(SearchError::InvalidDepth { depth })?;
        Ok(Self { variant, depth })
    }

    pub fn from_difficulty(variant: Variant, difficulty: AiDifficulty) -> Self {
        Self {
            variant,
            depth: difficulty.depth(),
        }
    }

    /// Replaces the depth with a preset's, leaving it unchanged for `None`.
    pub fn with_difficulty(mut self, difficulty: Option<AiDifficulty>) -> Self {
        if let Some(difficulty) = difficulty {
            self.depth = difficulty.depth();
        }
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub nodes_built: u64,
    pub nodes_visited: u64,
    pub cutoffs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub bag: Bag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Score>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchDecision {
    pub chosen: Bag,
    pub removal: Removal,
    pub evaluation: Score,
    pub candidates: Vec<Candidate>,
    pub stats: SearchStats,
    pub depth: u32,
    pub variant: Variant,
}

/// Scores a node: the exhaustion rule first, then the raw score for leaves,
/// otherwise plain minimax over the children.
pub fn evaluate(node: &Node, variant: Variant) -> Score {
    let score = node.bag.score();

    if node.bag.is_exhausted() {
        return match (variant, node.turn) {
            (Variant::Standard, Turn::Maximizing) | (Variant::Misere, Turn::Minimizing) => -score,
            (Variant::Standard, Turn::Minimizing) | (Variant::Misere, Turn::Maximizing) => score,
        };
    }

    let values = node.children.iter().map(|child| evaluate(child, variant));
    match node.turn {
        Turn::Maximizing => values.max().unwrap_or(score),
        Turn::Minimizing => values.min().unwrap_or(score),
    }
}

/// Alpha-beta value of `node` looking at most `remaining_ply` plies down.
pub fn alpha_beta(
    node: &Node,
    alpha: Score,
    beta: Score,
    remaining_ply: u32,
    variant: Variant,
) -> Score {
    let mut stats = SearchStats::default();
    search(node, alpha, beta, remaining_ply, variant, &mut stats)
}

pub(crate) fn search(
    node: &Node,
    mut alpha: Score,
    mut beta: Score,
    remaining_ply: u32,
    variant: Variant,
    stats: &mut SearchStats,
) -> Score {
    stats.nodes_visited += 1;

    if remaining_ply == 0 || node.is_leaf() {
        return evaluate(node, variant);
    }

    match node.turn {
        Turn::Maximizing => {
            let mut value = NEG_INFINITY;
            for child in &node.children {
                let score = search(child, alpha, beta, remaining_ply - 1, variant, stats);
                value = value.max(score);
                alpha = alpha.max(value);
                if beta <= alpha {
                    stats.cutoffs += 1;
                    break;
                }
            }
            value
        }
        Turn::Minimizing => {
            let mut value = POS_INFINITY;
            for child in &node.children {
                let score = search(child, alpha, beta, remaining_ply - 1, variant, stats);
                value = value.min(score);
                beta = beta.min(value);
                if beta <= alpha {
                    stats.cutoffs += 1;
                    break;
                }
            }
            value
        }
    }
}

/// Unpruned minimax with the same leaf rule as [`alpha_beta`]; used to validate pruning.
pub fn minimax(node: &Node, remaining_ply: u32, variant: Variant) -> Score {
    if remaining_ply == 0 || node.is_leaf() {
        return evaluate(node, variant);
    }

    let values = node
        .children
        .iter()
        .map(|child| minimax(child, remaining_ply - 1, variant));
    match node.turn {
        Turn::Maximizing => values.max().unwrap_or(NEG_INFINITY),
        Turn::Minimizing => values.min().unwrap_or(POS_INFINITY),
    }
}

/// 为电脑方构建搜索树并选出最佳走法。
pub fn decide(bag: Bag, config: &SearchConfig) -> Result<SearchDecision, SearchError> {
    if bag.is_empty() {
        return Err(SearchError::NoLegalMove { bag });
    }

    let effective_depth = config.depth.min(bag.total());
    if effective_depth > DEEP_SEARCH_WARNING_PLIES {
        console_warn!(
            "searching {effective_depth} plies from {bag}; tree size grows as 4^depth"
        );
    }

    let mut stats = SearchStats::default();
    let root = build_tree_with_stats(bag, config, &mut stats);

    let best = root
        .best_child()
        .ok_or(SearchError::NoLegalMove { bag })?;
    let removal = Removal::between(bag, best.bag).ok_or(SearchError::NoLegalMove { bag })?;
    let evaluation = best.value.unwrap_or_else(|| evaluate(best, config.variant));

    let candidates = root
        .children
        .iter()
        .map(|child| Candidate {
            bag: child.bag,
            value: child.value,
        })
        .collect();

    console_log!(
        "[{}] {bag} -> {} ({removal}), value {evaluation}, {} nodes built, {} visited, {} cutoffs",
        config.variant,
        best.bag,
        stats.nodes_built,
        stats.nodes_visited,
        stats.cutoffs
    );

    Ok(SearchDecision {
        chosen: best.bag,
        removal,
        evaluation,
        candidates,
        stats,
        depth: config.depth,
        variant: config.variant,
    })
}

pub fn compute_best_move(bag: Bag, variant: Variant, depth: i64) -> Result<Bag, SearchError> {
    let config = SearchConfig::new(variant, depth)?;
    decide(bag, &config).map(|decision| decision.chosen)
}
