//! 中国象棋 AI 自我对弈训练
//!
//! 两个 AI 引擎对弈并把每一步写成 JSON 训练数据

pub mod record;
pub mod selfplay;
pub mod storage;

pub use record::{AiStatsReport, GameStats, MoveRecord, StopReason};
pub use selfplay::{SelfPlayTrainer, TrainerConfig};
pub use storage::TrainingStorage;
