//! 走法生成和规则判定

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, BoardState, Ply};
use crate::constants::PERPETUAL_REPETITIONS;
use crate::outcome::{DrawReason, Outcome, WinReason};
use crate::piece::{Piece, PieceType, Position, Side};

/// 走法（起点行、起点列、终点行、终点列）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// 起始位置
    pub from: Position,
    /// 目标位置
    pub to: Position,
}

impl Move {
    /// 创建新走法
    pub fn new(from: Position, to: Position) -> Self {
        Self { from, to }
    }

    /// 从四元组坐标创建，任一坐标越界返回 None
    pub fn from_coords(coords: [u8; 4]) -> Option<Self> {
        let [from_row, from_col, to_row, to_col] = coords;
        Some(Self {
            from: Position::new(from_row, from_col)?,
            to: Position::new(to_row, to_col)?,
        })
    }

    /// 转换为四元组坐标
    pub fn to_coords(&self) -> [u8; 4] {
        [self.from.row, self.from.col, self.to.row, self.to.col]
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// 马的 8 个落点及对应的马腿
const HORSE_JUMPS: [((i8, i8), (i8, i8)); 8] = [
    ((2, 1), (1, 0)),
    ((2, -1), (1, 0)),
    ((-2, 1), (-1, 0)),
    ((-2, -1), (-1, 0)),
    ((1, 2), (0, 1)),
    ((-1, 2), (0, 1)),
    ((1, -2), (0, -1)),
    ((-1, -2), (0, -1)),
];

/// 走法生成器
pub struct MoveGenerator;

impl MoveGenerator {
    /// 生成指定阵营的所有伪合法走法（不考虑将军）
    pub fn generate_pseudo_legal(board: &Board, side: Side) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);

        for (pos, piece) in board.pieces(side) {
            Self::generate_piece_moves(board, pos, piece, &mut moves);
        }

        moves
    }

    /// 生成指定阵营的所有合法走法（过滤掉会导致己方被将军的走法）
    pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
        Self::generate_pseudo_legal(board, side)
            .into_iter()
            .filter(|mv| !Self::leaves_in_check(board, *mv, side))
            .collect()
    }

    /// 指定阵营是否至少有一个合法走法
    pub fn has_legal_move(board: &Board, side: Side) -> bool {
        Self::generate_pseudo_legal(board, side)
            .into_iter()
            .any(|mv| !Self::leaves_in_check(board, mv, side))
    }

    fn leaves_in_check(board: &Board, mv: Move, side: Side) -> bool {
        let mut test_board = board.clone();
        test_board.move_piece(mv.from, mv.to);
        Self::is_in_check(&test_board, side)
    }

    /// 生成指定棋子的所有伪合法走法
    fn generate_piece_moves(board: &Board, pos: Position, piece: Piece, moves: &mut Vec<Move>) {
        match piece.piece_type {
            PieceType::General => Self::generate_general_moves(board, pos, piece.side, moves),
            PieceType::Advisor => Self::generate_advisor_moves(board, pos, piece.side, moves),
            PieceType::Elephant => Self::generate_elephant_moves(board, pos, piece.side, moves),
            PieceType::Horse => Self::generate_horse_moves(board, pos, piece.side, moves),
            PieceType::Chariot => Self::generate_chariot_moves(board, pos, piece.side, moves),
            PieceType::Cannon => Self::generate_cannon_moves(board, pos, piece.side, moves),
            PieceType::Soldier => Self::generate_soldier_moves(board, pos, piece.side, moves),
        }
    }

    /// 将/帅：九宫格内直走一步
    fn generate_general_moves(board: &Board, pos: Position, side: Side, moves: &mut Vec<Move>) {
        for (dr, dc) in ORTHOGONAL {
            if let Some(to) = pos.offset(dr, dc) {
                if to.is_in_palace(side) {
                    Self::try_add_move(board, pos, to, side, moves);
                }
            }
        }
    }

    /// 士/仕：九宫格内斜走一步
    fn generate_advisor_moves(board: &Board, pos: Position, side: Side, moves: &mut Vec<Move>) {
        for (dr, dc) in DIAGONAL {
            if let Some(to) = pos.offset(dr, dc) {
                if to.is_in_palace(side) {
                    Self::try_add_move(board, pos, to, side, moves);
                }
            }
        }
    }

    /// 象/相：斜走两步，不能过河，象眼被堵不能走
    fn generate_elephant_moves(board: &Board, pos: Position, side: Side, moves: &mut Vec<Move>) {
        for (dr, dc) in DIAGONAL {
            let Some(eye) = pos.offset(dr, dc) else {
                continue;
            };
            if board.get(eye).is_some() {
                continue;
            }

            if let Some(to) = pos.offset(dr * 2, dc * 2) {
                if to.is_own_half(side) {
                    Self::try_add_move(board, pos, to, side, moves);
                }
            }
        }
    }

    /// 马/傌：日字，蹩马腿不能走
    fn generate_horse_moves(board: &Board, pos: Position, side: Side, moves: &mut Vec<Move>) {
        for ((dr, dc), (lr, lc)) in HORSE_JUMPS {
            let Some(leg) = pos.offset(lr, lc) else {
                continue;
            };
            if board.get(leg).is_some() {
                continue;
            }

            if let Some(to) = pos.offset(dr, dc) {
                Self::try_add_move(board, pos, to, side, moves);
            }
        }
    }

    /// 车/俥：直线任意步，遇子停下，可吃敌子
    fn generate_chariot_moves(board: &Board, pos: Position, side: Side, moves: &mut Vec<Move>) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = pos;
            while let Some(to) = current.offset(dr, dc) {
                if let Some(target) = board.get(to) {
                    if target.side != side {
                        moves.push(Move::new(pos, to));
                    }
                    break;
                }
                moves.push(Move::new(pos, to));
                current = to;
            }
        }
    }

    /// 炮/砲：不吃子时同车，吃子时必须隔一个炮架
    fn generate_cannon_moves(board: &Board, pos: Position, side: Side, moves: &mut Vec<Move>) {
        for (dr, dc) in ORTHOGONAL {
            let mut current = pos;
            let mut screened = false;

            while let Some(to) = current.offset(dr, dc) {
                match board.get(to) {
                    Some(target) if screened => {
                        if target.side != side {
                            moves.push(Move::new(pos, to));
                        }
                        break;
                    }
                    Some(_) => screened = true,
                    None if !screened => moves.push(Move::new(pos, to)),
                    None => {}
                }
                current = to;
            }
        }
    }

    /// 兵/卒：过河前只能前进，过河后可左右，永不后退
    fn generate_soldier_moves(board: &Board, pos: Position, side: Side, moves: &mut Vec<Move>) {
        if let Some(to) = pos.offset(side.forward(), 0) {
            Self::try_add_move(board, pos, to, side, moves);
        }

        if !pos.is_own_half(side) {
            for dc in [-1i8, 1i8] {
                if let Some(to) = pos.offset(0, dc) {
                    Self::try_add_move(board, pos, to, side, moves);
                }
            }
        }
    }

    /// 尝试添加走法（目标为空或为敌子）
    fn try_add_move(
        board: &Board,
        from: Position,
        to: Position,
        side: Side,
        moves: &mut Vec<Move>,
    ) {
        match board.get(to) {
            Some(target) if target.side == side => {}
            _ => moves.push(Move::new(from, to)),
        }
    }

    /// 检查指定阵营是否被将军（包括飞将）
    pub fn is_in_check(board: &Board, side: Side) -> bool {
        let Some(general) = board.find_general(side) else {
            return false;
        };

        if board.generals_facing() {
            return true;
        }

        board
            .pieces(side.opponent())
            .into_iter()
            .any(|(pos, piece)| Self::can_attack(board, pos, piece, general))
    }

    /// 检查棋子是否能走到目标位置（不考虑己方被将军）
    fn can_attack(board: &Board, from: Position, piece: Piece, target: Position) -> bool {
        let dr = target.row as i8 - from.row as i8;
        let dc = target.col as i8 - from.col as i8;

        match piece.piece_type {
            // 将帅对脸由 generals_facing 处理
            PieceType::General => {
                dr.abs() + dc.abs() == 1 && target.is_in_palace(piece.side)
            }
            PieceType::Advisor => {
                dr.abs() == 1 && dc.abs() == 1 && target.is_in_palace(piece.side)
            }
            PieceType::Elephant => {
                dr.abs() == 2
                    && dc.abs() == 2
                    && target.is_own_half(piece.side)
                    && from
                        .offset(dr / 2, dc / 2)
                        .is_some_and(|eye| board.get(eye).is_none())
            }
            PieceType::Horse => {
                let is_jump = (dr.abs() == 2 && dc.abs() == 1) || (dr.abs() == 1 && dc.abs() == 2);
                if !is_jump {
                    return false;
                }
                let (lr, lc) = if dr.abs() == 2 {
                    (dr.signum(), 0)
                } else {
                    (0, dc.signum())
                };
                from.offset(lr, lc)
                    .is_some_and(|leg| board.get(leg).is_none())
            }
            PieceType::Chariot => Self::pieces_between(board, from, target) == Some(0),
            PieceType::Cannon => Self::pieces_between(board, from, target) == Some(1),
            PieceType::Soldier => {
                let forward = dc == 0 && dr == piece.side.forward();
                let sideways = dr == 0 && dc.abs() == 1 && !from.is_own_half(piece.side);
                forward || sideways
            }
        }
    }

    /// 统计同一直线上两点之间（不含端点）的棋子数，不在同一直线返回 None
    fn pieces_between(board: &Board, from: Position, to: Position) -> Option<usize> {
        if from == to || (from.row != to.row && from.col != to.col) {
            return None;
        }

        let step = (
            (to.row as i8 - from.row as i8).signum(),
            (to.col as i8 - from.col as i8).signum(),
        );

        let mut count = 0;
        let mut current = from.offset(step.0, step.1)?;
        while current != to {
            if board.get(current).is_some() {
                count += 1;
            }
            current = current.offset(step.0, step.1)?;
        }
        Some(count)
    }

    /// 检查当前走子方是否被将死
    pub fn is_checkmate(state: &BoardState) -> bool {
        Self::is_in_check(&state.board, state.current_turn)
            && !Self::has_legal_move(&state.board, state.current_turn)
    }

    /// 检查当前走子方是否被困毙（无子可动但未被将军）
    pub fn is_stalemate(state: &BoardState) -> bool {
        !Self::is_in_check(&state.board, state.current_turn)
            && !Self::has_legal_move(&state.board, state.current_turn)
    }

    /// 重新判定终局
    ///
    /// 优先级：无子可动（将死或困毙，均判负） > 长将 > 步数上限和棋。
    pub fn update_outcome(state: &mut BoardState) {
        let side = state.current_turn;

        state.outcome = if !Self::has_legal_move(&state.board, side) {
            let reason = if Self::is_in_check(&state.board, side) {
                WinReason::Checkmate
            } else {
                WinReason::Stalemate
            };
            Some(Outcome::Win {
                winner: side.opponent(),
                reason,
            })
        } else if let Some(outcome) = Self::perpetual_check(state.history()) {
            Some(outcome)
        } else if state.move_count >= state.max_moves {
            Some(Outcome::Draw(DrawReason::MoveLimit))
        } else {
            None
        };

        if let Some(outcome) = state.outcome {
            debug!(
                "对局结束: {:?}, 步数 {}, 走子方 {}",
                outcome, state.move_count, side
            );
        }
    }

    /// 长将判定：当前局面第三次出现时，检查自首次出现以来的每一步
    fn perpetual_check(history: &[Ply]) -> Option<Outcome> {
        let last = history.last()?;
        let occurrences: Vec<usize> = history
            .iter()
            .enumerate()
            .filter(|(_, ply)| ply.hash == last.hash)
            .map(|(i, _)| i)
            .collect();

        if occurrences.len() < PERPETUAL_REPETITIONS {
            return None;
        }

        let window = &history[occurrences[0] + 1..];
        let always_checking = |side: Side| {
            let mut plies = window.iter().filter(|ply| ply.mover == side).peekable();
            plies.peek().is_some() && plies.all(|ply| ply.gave_check)
        };

        match (always_checking(Side::Red), always_checking(Side::Black)) {
            (true, true) => Some(Outcome::Draw(DrawReason::Repetition)),
            (true, false) => Some(Outcome::Win {
                winner: Side::Black,
                reason: WinReason::PerpetualCheck,
            }),
            (false, true) => Some(Outcome::Win {
                winner: Side::Red,
                reason: WinReason::PerpetualCheck,
            }),
            (false, false) => None,
        }
    }
}
