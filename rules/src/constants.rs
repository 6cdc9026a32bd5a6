//! 规则常量定义

/// 棋盘宽度（列数）
pub const BOARD_WIDTH: usize = 9;

/// 棋盘高度（行数）
pub const BOARD_HEIGHT: usize = 10;

/// 棋盘格子总数
pub const BOARD_CELLS: usize = BOARD_WIDTH * BOARD_HEIGHT;

/// 默认最大步数，达到后判和（限制自我对弈长度）
pub const MAX_MOVES: u32 = 200;

/// 同一局面出现该次数时检查长将
pub const PERPETUAL_REPETITIONS: usize = 3;
