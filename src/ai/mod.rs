//! 博弈树搜索模块（建树、局面评估、Alpha-Beta 剪枝）。

pub mod minimax;
pub mod tree;

pub use minimax::{
    alpha_beta, compute_best_move, decide, evaluate, minimax, AiDifficulty, Candidate,
    SearchConfig, SearchDecision, SearchError, SearchStats, NEG_INFINITY, POS_INFINITY,
};
pub use tree::{build_tree, build_tree_with_stats, to_mermaid, Node, Turn};
