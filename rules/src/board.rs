//! 棋盘状态
//!
//! `Board` 是 10 行 × 9 列的带符号编码网格，`BoardState` 在其上记录
//! 走子方、步数和终局信息。

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_HEIGHT, BOARD_WIDTH, MAX_MOVES};
use crate::moves::{Move, MoveGenerator};
use crate::outcome::Outcome;
use crate::piece::{Piece, PieceType, Position, Side};
use crate::zobrist::ZOBRIST;

/// 棋盘格子网格，`cells[row][col]`
pub type Cells = [[i8; BOARD_WIDTH]; BOARD_HEIGHT];

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: Cells,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            cells: [[0; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// 创建初始棋盘
    pub fn initial() -> Self {
        let mut board = Self::empty();

        // 底线：车马相仕帅仕相马车
        let back_rank = [
            PieceType::Chariot,
            PieceType::Horse,
            PieceType::Elephant,
            PieceType::Advisor,
            PieceType::General,
            PieceType::Advisor,
            PieceType::Elephant,
            PieceType::Horse,
            PieceType::Chariot,
        ];

        for (side, back, cannon, soldier) in [(Side::Red, 0, 2, 3), (Side::Black, 9, 7, 6)] {
            for (col, piece_type) in back_rank.iter().enumerate() {
                board.set(
                    Position::new_unchecked(back, col as u8),
                    Some(Piece::new(*piece_type, side)),
                );
            }
            for col in [1, 7] {
                board.set(
                    Position::new_unchecked(cannon, col),
                    Some(Piece::new(PieceType::Cannon, side)),
                );
            }
            for col in (0..9).step_by(2) {
                board.set(
                    Position::new_unchecked(soldier, col),
                    Some(Piece::new(PieceType::Soldier, side)),
                );
            }
        }

        board
    }

    /// 从编码网格创建，非法编码视为空格
    pub fn from_cells(cells: Cells) -> Self {
        let mut board = Self::empty();
        for (row, line) in cells.iter().enumerate() {
            for (col, &code) in line.iter().enumerate() {
                board.set(Position::new_unchecked(row as u8, col as u8), Piece::from_code(code));
            }
        }
        board
    }

    /// 原始编码网格
    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    /// 获取指定位置的格子编码
    pub fn code(&self, pos: Position) -> i8 {
        if pos.is_valid() {
            self.cells[pos.row as usize][pos.col as usize]
        } else {
            0
        }
    }

    /// 获取指定位置的棋子
    pub fn get(&self, pos: Position) -> Option<Piece> {
        Piece::from_code(self.code(pos))
    }

    /// 设置指定位置的棋子
    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        if pos.is_valid() {
            self.cells[pos.row as usize][pos.col as usize] = piece.map_or(0, |p| p.code());
        }
    }

    /// 移动棋子（不检查规则），返回被吃的棋子
    pub fn move_piece(&mut self, from: Position, to: Position) -> Option<Piece> {
        let piece = self.get(from);
        let captured = self.get(to);
        self.set(from, None);
        self.set(to, piece);
        captured
    }

    /// 查找指定阵营的将/帅位置
    pub fn find_general(&self, side: Side) -> Option<Position> {
        let code = Piece::new(PieceType::General, side).code();
        self.occupied()
            .find(|&(_, c)| c == code)
            .map(|(pos, _)| pos)
    }

    /// 获取指定阵营的所有棋子位置
    pub fn pieces(&self, side: Side) -> Vec<(Position, Piece)> {
        self.all_pieces()
            .into_iter()
            .filter(|(_, piece)| piece.side == side)
            .collect()
    }

    /// 获取所有棋子
    pub fn all_pieces(&self) -> Vec<(Position, Piece)> {
        self.occupied()
            .filter_map(|(pos, code)| Piece::from_code(code).map(|piece| (pos, piece)))
            .collect()
    }

    /// 统计指定棋子的数量
    pub fn count(&self, piece: Piece) -> usize {
        let code = piece.code();
        self.occupied().filter(|&(_, c)| c == code).count()
    }

    /// 检查两个将是否面对面（飞将）
    pub fn generals_facing(&self) -> bool {
        let (Some(red), Some(black)) =
            (self.find_general(Side::Red), self.find_general(Side::Black))
        else {
            return false;
        };

        if red.col != black.col {
            return false;
        }

        let (low, high) = if red.row < black.row {
            (red.row, black.row)
        } else {
            (black.row, red.row)
        };

        ((low + 1)..high).all(|row| self.code(Position::new_unchecked(row, red.col)) == 0)
    }

    /// 棋盘内容哈希（只包含 90 个格子）
    pub fn hash(&self) -> u64 {
        self.occupied()
            .filter_map(|(pos, code)| Piece::from_code(code).map(|piece| (pos, piece)))
            .fold(0u64, |hash, (pos, piece)| {
                hash ^ ZOBRIST.piece_hash(piece, pos.to_index())
            })
    }

    fn occupied(&self) -> impl Iterator<Item = (Position, i8)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .filter(|(_, &code)| code != 0)
                .map(move |(col, &code)| (Position::new_unchecked(row as u8, col as u8), code))
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

/// 单步历史（用于长将判定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ply {
    /// 走完这一步后的局面哈希（含走子方）
    pub hash: u64,
    /// 走这一步的阵营
    pub mover: Side,
    /// 这一步是否将军
    pub gave_check: bool,
}

/// 完整的棋盘状态（包含走子方、步数、终局信息）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    /// 棋盘
    pub board: Board,
    /// 当前走子方
    pub current_turn: Side,
    /// 已走步数
    pub move_count: u32,
    /// 最大步数，达到后判和
    pub max_moves: u32,
    /// 终局结果，只由规则引擎设置
    pub(crate) outcome: Option<Outcome>,
    /// 局面历史
    pub(crate) history: Vec<Ply>,
}

impl BoardState {
    /// 创建初始状态
    pub fn initial() -> Self {
        Self::from_board(Board::initial(), Side::Red)
    }

    /// 从棋盘创建状态，并立即判定终局
    pub fn from_board(board: Board, current_turn: Side) -> Self {
        let gave_check = MoveGenerator::is_in_check(&board, current_turn);
        let mut state = Self {
            board,
            current_turn,
            move_count: 0,
            max_moves: MAX_MOVES,
            outcome: None,
            history: Vec::new(),
        };
        state.history.push(Ply {
            hash: state.hash(),
            mover: current_turn.opponent(),
            gave_check,
        });
        MoveGenerator::update_outcome(&mut state);
        state
    }

    /// 设置最大步数
    pub fn with_move_limit(mut self, max_moves: u32) -> Self {
        self.max_moves = max_moves;
        MoveGenerator::update_outcome(&mut self);
        self
    }

    /// 执行走法
    ///
    /// 走法必须来自 [`MoveGenerator::legal_moves`]，这里不再验证规则。
    /// 坐标越界属于调用方违约，直接 panic。
    pub fn apply(&mut self, mv: Move) {
        assert!(
            mv.from.is_valid() && mv.to.is_valid(),
            "move out of board: {}",
            mv
        );

        let mover = self
            .board
            .get(mv.from)
            .map_or(self.current_turn, |piece| piece.side);

        self.board.move_piece(mv.from, mv.to);
        self.current_turn = mover.opponent();
        self.move_count += 1;

        let gave_check = MoveGenerator::is_in_check(&self.board, self.current_turn);
        self.history.push(Ply {
            hash: self.hash(),
            mover,
            gave_check,
        });

        MoveGenerator::update_outcome(self);
    }

    /// 指定阵营的所有合法走法
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        MoveGenerator::legal_moves(&self.board, side)
    }

    /// 指定阵营是否被将军
    pub fn in_check(&self, side: Side) -> bool {
        MoveGenerator::is_in_check(&self.board, side)
    }

    /// 游戏是否结束
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// 终局结果
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// 获胜方（未结束或和棋返回 None）
    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(|outcome| outcome.winner())
    }

    /// 局面哈希（棋盘内容 + 走子方）
    pub fn hash(&self) -> u64 {
        self.board.hash() ^ ZOBRIST.side_hash(self.current_turn)
    }

    pub(crate) fn history(&self) -> &[Ply] {
        &self.history
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::Fen;
    use crate::outcome::{DrawReason, WinReason};

    #[test]
    fn test_initial_board() {
        let board = Board::initial();

        assert_eq!(
            board.get(Position::new_unchecked(0, 4)),
            Some(Piece::new(PieceType::General, Side::Red))
        );
        assert_eq!(
            board.get(Position::new_unchecked(9, 4)),
            Some(Piece::new(PieceType::General, Side::Black))
        );
        assert_eq!(
            board.get(Position::new_unchecked(2, 1)),
            Some(Piece::new(PieceType::Cannon, Side::Red))
        );
        assert_eq!(
            board.get(Position::new_unchecked(6, 0)),
            Some(Piece::new(PieceType::Soldier, Side::Black))
        );

        assert_eq!(board.all_pieces().len(), 32);
        assert_eq!(board.code(Position::new_unchecked(0, 0)), 5);
        assert_eq!(board.code(Position::new_unchecked(9, 1)), -4);
    }

    #[test]
    fn test_move_piece() {
        let mut board = Board::initial();
        let from = Position::new_unchecked(2, 1);
        let to = Position::new_unchecked(4, 1);

        let captured = board.move_piece(from, to);
        assert!(captured.is_none());
        assert!(board.get(from).is_none());
        assert_eq!(board.get(to), Some(Piece::new(PieceType::Cannon, Side::Red)));

        // 炮打马
        let captured = board.move_piece(to, Position::new_unchecked(9, 1));
        assert_eq!(captured, Some(Piece::new(PieceType::Horse, Side::Black)));
    }

    #[test]
    fn test_find_general() {
        let board = Board::initial();
        assert_eq!(board.find_general(Side::Red), Some(Position::new_unchecked(0, 4)));
        assert_eq!(board.find_general(Side::Black), Some(Position::new_unchecked(9, 4)));
        assert_eq!(Board::empty().find_general(Side::Red), None);
    }

    #[test]
    fn test_generals_facing() {
        let mut board = Board::empty();
        board.set(Position::new_unchecked(0, 4), Some(Piece::new(PieceType::General, Side::Red)));
        board.set(Position::new_unchecked(9, 4), Some(Piece::new(PieceType::General, Side::Black)));
        assert!(board.generals_facing());

        board.set(Position::new_unchecked(5, 4), Some(Piece::new(PieceType::Soldier, Side::Red)));
        assert!(!board.generals_facing());
    }

    #[test]
    fn test_clone_is_independent() {
        let state = BoardState::initial();
        let mut copy = state.clone();
        let mv = Move::new(Position::new_unchecked(3, 0), Position::new_unchecked(4, 0));
        copy.apply(mv);

        assert_ne!(state.board, copy.board);
        assert_eq!(state.current_turn, Side::Red);
        assert_eq!(state.move_count, 0);
        assert_eq!(copy.current_turn, Side::Black);
        assert_eq!(copy.move_count, 1);
    }

    #[test]
    fn test_hash_tracks_content_and_turn() {
        let board = Board::initial();
        assert_eq!(board.hash(), Board::initial().hash());

        let red = BoardState::from_board(board.clone(), Side::Red);
        let black = BoardState::from_board(board.clone(), Side::Black);
        assert_eq!(red.board.hash(), black.board.hash());
        assert_ne!(red.hash(), black.hash());

        let mut moved = board.clone();
        moved.move_piece(Position::new_unchecked(2, 1), Position::new_unchecked(2, 4));
        assert_ne!(board.hash(), moved.hash());
    }

    #[test]
    fn test_from_cells() {
        let board = Board::initial();
        assert_eq!(Board::from_cells(*board.cells()), board);
    }

    #[test]
    #[should_panic]
    fn test_apply_out_of_board_panics() {
        let mut state = BoardState::initial();
        state.apply(Move::new(Position::new_unchecked(0, 0), Position::new_unchecked(10, 0)));
    }

    #[test]
    fn test_checkmate_sets_winner() {
        // 红车沉底，另一车封锁下二路
        let mut state = Fen::parse("4k4/1R7/9/9/9/9/9/9/9/R2K5 r 0 1").unwrap();
        assert!(!state.is_game_over());

        state.apply(Move::new(Position::new_unchecked(0, 0), Position::new_unchecked(9, 0)));

        assert!(state.legal_moves(Side::Black).is_empty());
        assert!(state.in_check(Side::Black));
        assert!(state.is_game_over());
        assert_eq!(state.winner(), Some(Side::Red));
        assert_eq!(
            state.outcome(),
            Some(Outcome::Win {
                winner: Side::Red,
                reason: WinReason::Checkmate
            })
        );
    }

    #[test]
    fn test_stalemate_is_loss() {
        // 黑将未被将军，但所有去路都被封住
        let state = Fen::parse("4k4/R8/9/9/9/9/9/9/9/3K1R3 b 0 1").unwrap();

        assert!(!state.in_check(Side::Black));
        assert!(state.legal_moves(Side::Black).is_empty());
        assert_eq!(
            state.outcome(),
            Some(Outcome::Win {
                winner: Side::Red,
                reason: WinReason::Stalemate
            })
        );
    }

    #[test]
    fn test_move_limit_draw() {
        // 双方将帅来回走，没有吃子也没有将军
        let mut state = Fen::parse("3k5/9/9/9/9/9/9/9/9/4K4 r 0 1").unwrap();
        let shuffles = [
            Move::new(Position::new_unchecked(0, 4), Position::new_unchecked(1, 4)),
            Move::new(Position::new_unchecked(9, 3), Position::new_unchecked(8, 3)),
            Move::new(Position::new_unchecked(1, 4), Position::new_unchecked(0, 4)),
            Move::new(Position::new_unchecked(8, 3), Position::new_unchecked(9, 3)),
        ];

        for i in 0..MAX_MOVES as usize {
            assert!(!state.is_game_over(), "ended early at move {}", i);
            let mv = shuffles[i % shuffles.len()];
            assert!(state.legal_moves(state.current_turn).contains(&mv));
            state.apply(mv);
        }

        assert_eq!(state.move_count, MAX_MOVES);
        assert_eq!(state.outcome(), Some(Outcome::Draw(DrawReason::MoveLimit)));
        assert_eq!(state.winner(), None);
    }

    #[test]
    fn test_custom_move_limit() {
        let mut state = BoardState::initial().with_move_limit(2);
        state.apply(Move::new(Position::new_unchecked(3, 0), Position::new_unchecked(4, 0)));
        assert!(!state.is_game_over());
        state.apply(Move::new(Position::new_unchecked(6, 0), Position::new_unchecked(5, 0)));
        assert_eq!(state.outcome(), Some(Outcome::Draw(DrawReason::MoveLimit)));
    }
}
