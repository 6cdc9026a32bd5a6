//! FEN 格式解析和生成
//!
//! 中国象棋 FEN 格式：
//! `<棋盘> <走子方> <无吃子步数> <回合数>`
//!
//! 示例：
//! `rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR r 0 1`
//!
//! 无吃子步数只为兼容而保留，解析时忽略。

use crate::board::{Board, BoardState};
use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH};
use crate::error::{ChessError, Result};
use crate::moves::MoveGenerator;
use crate::piece::{Piece, PieceType, Position, Side};

/// 初始局面 FEN
pub const INITIAL_FEN: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR r 0 1";

/// FEN 格式处理
pub struct Fen;

impl Fen {
    /// 解析 FEN 字符串为棋盘状态，并重新判定终局
    pub fn parse(fen: &str) -> Result<BoardState> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        let Some(board_part) = parts.first() else {
            return Err(ChessError::InvalidFen {
                reason: "Empty FEN string".to_string(),
            });
        };

        let board = Self::parse_board(board_part)?;
        Self::validate_generals(&board)?;

        let current_turn = match parts.get(1) {
            Some(field) => field
                .chars()
                .next()
                .and_then(Side::from_fen_char)
                .ok_or_else(|| ChessError::InvalidFen {
                    reason: format!("Invalid side to move: {}", field),
                })?,
            None => Side::Red,
        };

        let round: u32 = match parts.get(3) {
            Some(field) => field.parse().map_err(|_| ChessError::InvalidFen {
                reason: format!("Invalid round number: {}", field),
            })?,
            None => 1,
        };

        let move_count = round
            .saturating_sub(1)
            .checked_mul(2)
            .and_then(|count| count.checked_add(u32::from(current_turn == Side::Black)))
            .ok_or_else(|| ChessError::InvalidFen {
                reason: format!("Round number out of range: {}", round),
            })?;

        let mut state = BoardState::from_board(board, current_turn);
        state.move_count = move_count;
        MoveGenerator::update_outcome(&mut state);
        Ok(state)
    }

    /// 每方必须恰好有一个将/帅
    fn validate_generals(board: &Board) -> Result<()> {
        for side in [Side::Red, Side::Black] {
            let count = board.count(Piece::new(PieceType::General, side));
            if count != 1 {
                return Err(ChessError::InvalidPosition {
                    reason: format!("{} has {} generals, expected 1", side, count),
                });
            }
        }
        Ok(())
    }

    /// 解析棋盘部分
    fn parse_board(board_str: &str) -> Result<Board> {
        let mut board = Board::empty();
        let rows: Vec<&str> = board_str.split('/').collect();

        if rows.len() != BOARD_HEIGHT {
            return Err(ChessError::InvalidFen {
                reason: format!("Expected 10 rows, got {}", rows.len()),
            });
        }

        // FEN 从上到下是第 9 行到第 0 行
        for (row_idx, row) in rows.iter().enumerate() {
            let board_row = (BOARD_HEIGHT - 1 - row_idx) as u8;
            let mut col = 0usize;

            for c in row.chars() {
                if col >= BOARD_WIDTH {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Row {} has too many columns", row_idx),
                    });
                }

                if let Some(empty) = c.to_digit(10) {
                    col += empty as usize;
                } else if let Some(piece) = Piece::from_fen_char(c) {
                    board.set(Position::new_unchecked(board_row, col as u8), Some(piece));
                    col += 1;
                } else {
                    return Err(ChessError::InvalidFen {
                        reason: format!("Invalid piece character: {}", c),
                    });
                }
            }

            if col != BOARD_WIDTH {
                return Err(ChessError::InvalidFen {
                    reason: format!("Row {} has {} columns, expected 9", row_idx, col),
                });
            }
        }

        Ok(board)
    }

    /// 将棋盘状态转换为 FEN 字符串
    pub fn to_string(state: &BoardState) -> String {
        format!(
            "{} {} 0 {}",
            Self::board_to_string(&state.board),
            state.current_turn.to_fen_char(),
            state.move_count / 2 + 1
        )
    }

    /// 将棋盘转换为 FEN 棋盘部分
    pub fn board_to_string(board: &Board) -> String {
        let mut rows = Vec::with_capacity(BOARD_HEIGHT);

        for row in (0..BOARD_HEIGHT as u8).rev() {
            let mut line = String::new();
            let mut empty_count = 0;

            for col in 0..BOARD_WIDTH as u8 {
                if let Some(piece) = board.get(Position::new_unchecked(row, col)) {
                    if empty_count > 0 {
                        line.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    line.push(piece.to_fen_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                line.push_str(&empty_count.to_string());
            }

            rows.push(line);
        }

        rows.join("/")
    }
}
