//! 中国象棋规则引擎
//!
//! 包含:
//! - 棋子、棋盘、位置等核心数据结构
//! - 走法生成和规则验证（九宫、象眼、马腿、炮架、飞将）
//! - 将死、困毙、长将、步数上限等终局判定
//! - FEN 格式
//! - Zobrist 局面哈希

mod board;
mod constants;
mod error;
mod fen;
mod moves;
mod outcome;
mod piece;
mod zobrist;

pub use board::{Board, BoardState, Cells};
pub use constants::*;
pub use error::{ChessError, Result};
pub use fen::{Fen, INITIAL_FEN};
pub use moves::{Move, MoveGenerator};
pub use outcome::{DrawReason, Outcome, WinReason};
pub use piece::{Piece, PieceType, Position, Side};
pub use zobrist::ZobristTable;
