//! 游戏核心逻辑模块（局面、走法生成、规则引擎）。

pub mod rules;
pub mod state;

pub use rules::{
    generate_successors, legal_moves, move_order, GameEvent, Removal, RuleEngine, RuleError,
    RuleResolution,
};
pub use state::{Bag, Color, GameConfig, GameState, IntegrityError, Outcome, Player, Score, Variant};
