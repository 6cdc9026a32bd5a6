//! 中国象棋 AI 引擎
//!
//! 包含:
//! - 混合评估函数（前馈网络 + 子力）
//! - Minimax + Alpha-Beta 搜索
//! - 置换表

mod error;
mod evaluate;
mod network;
mod search;
mod transposition;

pub use error::EvalError;
pub use evaluate::{EvalStats, Evaluator, DEFAULT_LAYERS, FEATURE_COUNT};
pub use network::{Layer, Network};
pub use search::{AiConfig, AiEngine, AiStats, Difficulty, DEFAULT_CACHE_LIMIT, WIN_SCORE};
pub use transposition::{EntryType, SearchKey, TTEntry, TTStats, TranspositionTable};
