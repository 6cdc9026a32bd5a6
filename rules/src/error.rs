//! 错误类型定义

use thiserror::Error;

/// 象棋规则错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChessError {
    /// 无效的 FEN 字符串
    #[error("Invalid FEN string: {reason}")]
    InvalidFen { reason: String },

    /// 棋盘不满足基本约束（每方恰好一个将/帅）
    #[error("Invalid position: {reason}")]
    InvalidPosition { reason: String },
}

/// 规则操作结果类型
pub type Result<T> = std::result::Result<T, ChessError>;
