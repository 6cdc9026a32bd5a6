//! Zobrist 哈希
//!
//! 为每个位置的每种棋子生成固定的随机数，局面哈希为所有棋子随机数的异或

use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::constants::BOARD_CELLS;
use crate::piece::{Piece, Side};

/// 进程内共享的只读哈希表
pub(crate) static ZOBRIST: Lazy<ZobristTable> = Lazy::new(ZobristTable::new);

/// Zobrist 哈希表
pub struct ZobristTable {
    /// 棋子哈希值 [side][piece_type][position]
    pieces: [[[u64; BOARD_CELLS]; 7]; 2],
    /// 黑方走子时的哈希值
    side_to_move: u64,
}

impl ZobristTable {
    /// 创建新的 Zobrist 表（使用固定种子保证确定性）
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(0xDEADBEEF_CAFE_1234);

        let mut pieces = [[[0u64; BOARD_CELLS]; 7]; 2];
        for side in pieces.iter_mut() {
            for piece in side.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        Self {
            pieces,
            side_to_move: rng.gen(),
        }
    }

    /// 获取棋子在指定格子上的哈希值
    #[inline]
    pub fn piece_hash(&self, piece: Piece, index: usize) -> u64 {
        let side_idx = match piece.side {
            Side::Red => 0,
            Side::Black => 1,
        };
        let piece_idx = (piece.piece_type.code() - 1) as usize;
        self.pieces[side_idx][piece_idx][index]
    }

    /// 获取走子方的哈希值（红方为 0）
    #[inline]
    pub fn side_hash(&self, side: Side) -> u64 {
        match side {
            Side::Red => 0,
            Side::Black => self.side_to_move,
        }
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}
