//! 对局结果

use serde::{Deserialize, Serialize};

use crate::piece::Side;

/// 胜利原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinReason {
    /// 将死
    Checkmate,
    /// 困毙（无子可动但未被将军，判负）
    Stalemate,
    /// 对方长将
    PerpetualCheck,
}

/// 和棋原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    /// 达到最大步数
    MoveLimit,
    /// 双方互相长将
    Repetition,
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// 一方获胜
    Win { winner: Side, reason: WinReason },
    /// 和棋
    Draw(DrawReason),
}

impl Outcome {
    /// 获胜方（和棋返回 None）
    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Win { winner, .. } => Some(*winner),
            Outcome::Draw(_) => None,
        }
    }

    /// 用于记录的简短结果：`red`、`black` 或 `draw`
    pub fn label(&self) -> &'static str {
        match self.winner() {
            Some(Side::Red) => "red",
            Some(Side::Black) => "black",
            None => "draw",
        }
    }
}
