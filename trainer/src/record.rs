//! 自我对弈数据格式

use chess_ai::AiStats;
use chrono::{DateTime, Utc};
use rules::{Cells, Side};
use serde::{Deserialize, Serialize};

/// 单步走法记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub game_id: u32,
    /// 局内步数，从 1 开始
    pub move_number: u32,
    /// 走子方
    pub player: Side,
    /// 走子前的棋盘
    pub board_state: Cells,
    /// [from_row, from_col, to_row, to_col]
    #[serde(rename = "move")]
    pub mv: [u8; 4],
    /// 走动棋子的类型编号（1-7）
    pub piece_type: u8,
    /// 被吃棋子的类型编号，没有吃子为 0
    pub captured_piece: u8,
    /// 对局结果："red" / "black" / "draw"，对局结束后回填
    pub result: String,
}

/// 训练停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Unknown,
    TimeLimit,
    GameLimit,
    UserInterrupt,
}

/// 训练汇总统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStats {
    pub total_games: u32,
    pub red_wins: u32,
    pub black_wins: u32,
    pub draws: u32,
    pub total_moves: u64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// 总耗时（秒）
    pub total_time: f64,
    pub stop_reason: StopReason,
}

impl GameStats {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            total_games: 0,
            red_wins: 0,
            black_wins: 0,
            draws: 0,
            total_moves: 0,
            start_time,
            end_time: None,
            total_time: 0.0,
            stop_reason: StopReason::Unknown,
        }
    }

    /// 记录一局结果
    pub fn record_game(&mut self, winner: Option<Side>, moves: usize) {
        self.total_games += 1;
        self.total_moves += moves as u64;
        match winner {
            Some(Side::Red) => self.red_wins += 1,
            Some(Side::Black) => self.black_wins += 1,
            None => self.draws += 1,
        }
    }

    /// 结束统计
    pub fn finish(&mut self, end_time: DateTime<Utc>, stop_reason: StopReason) {
        self.end_time = Some(end_time);
        self.total_time = (end_time - self.start_time).num_milliseconds() as f64 / 1000.0;
        self.stop_reason = stop_reason;
    }

    /// 平均每局步数
    pub fn average_moves(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            self.total_moves as f64 / self.total_games as f64
        }
    }

    pub fn win_rate(&self, side: Side) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        let wins = match side {
            Side::Red => self.red_wins,
            Side::Black => self.black_wins,
        };
        wins as f64 / self.total_games as f64
    }
}

/// 双方 AI 的统计
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiStatsReport {
    pub red: AiStats,
    pub black: AiStats,
}
