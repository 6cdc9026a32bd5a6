//! 棋局评估函数
//!
//! 最终得分 = 网络评分 × 0.7 + 子力分 × 0.3（权重可配置），分值越高对评估方越有利。
//! 网络计算失败时退回纯子力分。

use rules::{Board, Piece, PieceType, Side, BOARD_CELLS};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::EvalError;
use crate::network::Network;

/// 特征向量长度：90 个格子 + 红方 7 种棋子数 + 黑方 7 种棋子数 + 评估方
pub const FEATURE_COUNT: usize = BOARD_CELLS + 7 + 7 + 1;

/// 默认网络结构（9 层）
pub const DEFAULT_LAYERS: [usize; 10] = [FEATURE_COUNT, 256, 128, 64, 32, 16, 8, 4, 2, 1];

/// 评估器统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalStats {
    pub hits: u64,
    pub misses: u64,
    /// 实际计算的评估次数
    pub evaluations: u64,
    /// 网络计算失败、退回子力分的次数
    pub fallbacks: u64,
}

/// 评估器
pub struct Evaluator {
    network: Network,
    learned_weight: f64,
    material_weight: f64,
    /// (棋盘哈希, 评估方) -> 分数
    cache: FxHashMap<(u64, Side), f64>,
    stats: EvalStats,
}

impl Evaluator {
    /// 使用默认 0.7 / 0.3 权重创建
    pub fn new(network: Network) -> Self {
        Self::with_weights(network, 0.7, 0.3)
    }

    /// 指定网络分与子力分的权重
    pub fn with_weights(network: Network, learned_weight: f64, material_weight: f64) -> Self {
        Self {
            network,
            learned_weight,
            material_weight,
            cache: FxHashMap::default(),
            stats: EvalStats::default(),
        }
    }

    /// 评估棋局（带缓存）
    pub fn evaluate(&mut self, board: &Board, side: Side) -> f64 {
        let key = (board.hash(), side);
        if let Some(&score) = self.cache.get(&key) {
            self.stats.hits += 1;
            return score;
        }

        self.stats.misses += 1;
        self.stats.evaluations += 1;

        let score = match self.score(board, side) {
            Ok(score) => score,
            Err(err) => {
                self.stats.fallbacks += 1;
                warn!("评估网络计算失败，退回子力评估: {}", err);
                Self::evaluate_material(board, side) as f64
            }
        };

        self.cache.insert(key, score);
        score
    }

    /// 计算组合分数（不使用缓存）
    pub fn score(&self, board: &Board, side: Side) -> Result<f64, EvalError> {
        let learned = self.learned_score(board, side)?;
        let material = Self::evaluate_material(board, side) as f64;
        Ok(learned * self.learned_weight + material * self.material_weight)
    }

    /// 网络评分
    pub fn learned_score(&self, board: &Board, side: Side) -> Result<f64, EvalError> {
        let input = Self::encode(board, side);
        self.network.forward(&input).map(f64::from)
    }

    /// 将棋盘编码为网络输入
    pub fn encode(board: &Board, side: Side) -> Vec<f32> {
        let mut features = Vec::with_capacity(FEATURE_COUNT);

        features.extend(board.cells().iter().flatten().map(|&code| code as f32));

        for owner in [Side::Red, Side::Black] {
            for piece_type in PieceType::ALL {
                features.push(board.count(Piece::new(piece_type, owner)) as f32);
            }
        }

        features.push(side.sign() as f32);
        features
    }

    /// 子力分（评估方视角）
    pub fn evaluate_material(board: &Board, side: Side) -> i32 {
        board
            .all_pieces()
            .into_iter()
            .map(|(_, piece)| {
                let weight = piece.piece_type.weight();
                if piece.side == side {
                    weight
                } else {
                    -weight
                }
            })
            .sum()
    }

    /// 缓存条目数
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// 清空缓存
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> EvalStats {
        self.stats
    }
}
