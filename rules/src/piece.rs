//! 棋子定义
//!
//! 棋盘格子使用带符号整数编码：0 为空，正数为红方，负数为黑方，
//! 绝对值 1..=7 依次对应 将、士、象、马、车、炮、兵。

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};

/// 棋子类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceType {
    /// 将/帅
    General,
    /// 士/仕
    Advisor,
    /// 象/相
    Elephant,
    /// 马/傌
    Horse,
    /// 车/俥
    Chariot,
    /// 炮/砲
    Cannon,
    /// 兵/卒
    Soldier,
}

impl PieceType {
    /// 全部棋子类型，按编码顺序
    pub const ALL: [PieceType; 7] = [
        PieceType::General,
        PieceType::Advisor,
        PieceType::Elephant,
        PieceType::Horse,
        PieceType::Chariot,
        PieceType::Cannon,
        PieceType::Soldier,
    ];

    /// 棋子编码的绝对值（1..=7）
    pub fn code(&self) -> i8 {
        match self {
            PieceType::General => 1,
            PieceType::Advisor => 2,
            PieceType::Elephant => 3,
            PieceType::Horse => 4,
            PieceType::Chariot => 5,
            PieceType::Cannon => 6,
            PieceType::Soldier => 7,
        }
    }

    /// 从编码绝对值解析
    pub fn from_code(code: i8) -> Option<PieceType> {
        match code {
            1 => Some(PieceType::General),
            2 => Some(PieceType::Advisor),
            3 => Some(PieceType::Elephant),
            4 => Some(PieceType::Horse),
            5 => Some(PieceType::Chariot),
            6 => Some(PieceType::Cannon),
            7 => Some(PieceType::Soldier),
            _ => None,
        }
    }

    /// 子力权重（用于 AI 评估）
    pub fn weight(&self) -> i32 {
        match self {
            PieceType::General => 1000,
            PieceType::Advisor => 20,
            PieceType::Elephant => 20,
            PieceType::Horse => 40,
            PieceType::Chariot => 90,
            PieceType::Cannon => 45,
            PieceType::Soldier => 10,
        }
    }

    /// 获取 FEN 字符（红方大写，黑方小写）
    pub fn to_fen_char(&self, side: Side) -> char {
        let c = match self {
            PieceType::General => 'k',
            PieceType::Advisor => 'a',
            PieceType::Elephant => 'b',
            PieceType::Horse => 'n',
            PieceType::Chariot => 'r',
            PieceType::Cannon => 'c',
            PieceType::Soldier => 'p',
        };
        match side {
            Side::Red => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    /// 从 FEN 字符解析（兼容 e/h 写法）
    pub fn from_fen_char(c: char) -> Option<(PieceType, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::Red
        } else {
            Side::Black
        };
        let piece_type = match c.to_ascii_lowercase() {
            'k' => PieceType::General,
            'a' => PieceType::Advisor,
            'b' | 'e' => PieceType::Elephant,
            'n' | 'h' => PieceType::Horse,
            'r' => PieceType::Chariot,
            'c' => PieceType::Cannon,
            'p' => PieceType::Soldier,
            _ => return None,
        };
        Some((piece_type, side))
    }
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 红方（先手，在下方）
    Red,
    /// 黑方（后手，在上方）
    Black,
}

impl Side {
    /// 获取对方阵营
    pub fn opponent(&self) -> Side {
        match self {
            Side::Red => Side::Black,
            Side::Black => Side::Red,
        }
    }

    /// 棋子编码的符号
    pub fn sign(&self) -> i8 {
        match self {
            Side::Red => 1,
            Side::Black => -1,
        }
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Side::Red => 'r',
            Side::Black => 'b',
        }
    }

    /// 从 FEN 字符解析（`w` 视为红方）
    pub fn from_fen_char(c: char) -> Option<Side> {
        match c {
            'r' | 'R' | 'w' | 'W' => Some(Side::Red),
            'b' | 'B' => Some(Side::Black),
            _ => None,
        }
    }

    /// 兵向前走的行增量
    pub fn forward(&self) -> i8 {
        match self {
            Side::Red => 1,
            Side::Black => -1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Red => write!(f, "red"),
            Side::Black => write!(f, "black"),
        }
    }
}

/// 棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub piece_type: PieceType,
    pub side: Side,
}

impl Piece {
    /// 创建新棋子
    pub fn new(piece_type: PieceType, side: Side) -> Self {
        Self { piece_type, side }
    }

    /// 带符号的格子编码
    pub fn code(&self) -> i8 {
        self.piece_type.code() * self.side.sign()
    }

    /// 从格子编码解析，0 或越界编码返回 None
    pub fn from_code(code: i8) -> Option<Piece> {
        let side = match code.signum() {
            1 => Side::Red,
            -1 => Side::Black,
            _ => return None,
        };
        PieceType::from_code(code.checked_abs()?).map(|piece_type| Piece { piece_type, side })
    }

    /// 获取 FEN 字符
    pub fn to_fen_char(&self) -> char {
        self.piece_type.to_fen_char(self.side)
    }

    /// 从 FEN 字符解析
    pub fn from_fen_char(c: char) -> Option<Piece> {
        PieceType::from_fen_char(c).map(|(piece_type, side)| Piece { piece_type, side })
    }
}

/// 棋盘位置
///
/// 第 0 行是红方底线，第 9 行是黑方底线。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 行 (0-9)
    pub row: u8,
    /// 列 (0-8)
    pub col: u8,
}

impl Position {
    /// 创建新位置
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_HEIGHT && (col as usize) < BOARD_WIDTH {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 创建新位置（不检查边界，内部使用）
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_HEIGHT && (self.col as usize) < BOARD_WIDTH
    }

    /// 检查位置是否在指定阵营的半场（未过河）
    pub fn is_own_half(&self, side: Side) -> bool {
        match side {
            Side::Red => self.row < 5,
            Side::Black => self.row >= 5,
        }
    }

    /// 检查位置是否在九宫格内
    pub fn is_in_palace(&self, side: Side) -> bool {
        let in_col = (3..=5).contains(&self.col);
        let in_row = match side {
            Side::Red => (0..=2).contains(&self.row),
            Side::Black => (7..=9).contains(&self.row),
        };
        in_col && in_row
    }

    /// 获取偏移后的位置
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if row >= 0 && (row as usize) < BOARD_HEIGHT && col >= 0 && (col as usize) < BOARD_WIDTH {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// 转换为数组索引（行优先）
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_WIDTH + self.col as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_WIDTH * BOARD_HEIGHT {
            Some(Position {
                row: (index / BOARD_WIDTH) as u8,
                col: (index % BOARD_WIDTH) as u8,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
