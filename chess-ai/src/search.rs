//! 搜索引擎
//!
//! 实现 Minimax + Alpha-Beta 剪枝 + 置换表

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rules::{BoardState, Move, Outcome, Side};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluate::{Evaluator, DEFAULT_LAYERS};
use crate::network::Network;
use crate::transposition::{EntryType, SearchKey, TranspositionTable};

/// 分出胜负的局面在评估分之外额外加减的分数
pub const WIN_SCORE: f64 = 100_000.0;

/// 搜索使用的默认缓存上限
pub const DEFAULT_CACHE_LIMIT: usize = 100_000;

/// AI 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// 简单：depth=1
    Easy,
    /// 中等：depth=2
    Medium,
    /// 困难：depth=3
    Hard,
}

/// AI 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub difficulty: Difficulty,
    pub search_depth: u8,
    /// 缓存总条目上限，超过后整表清空
    pub cache_limit: usize,
    /// 随机种子（网络初始化与根节点走法打乱），None 表示每次不同
    pub seed: Option<u64>,
    /// 网络层宽，首项必须等于特征数
    pub network_layers: Vec<usize>,
    pub learned_weight: f64,
    pub material_weight: f64,
}

impl AiConfig {
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let search_depth = match difficulty {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        };
        Self {
            difficulty,
            search_depth,
            cache_limit: DEFAULT_CACHE_LIMIT,
            seed: None,
            network_layers: DEFAULT_LAYERS.to_vec(),
            learned_weight: 0.7,
            material_weight: 0.3,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_depth(mut self, search_depth: u8) -> Self {
        self.search_depth = search_depth;
        self
    }

    pub fn with_cache_limit(mut self, cache_limit: usize) -> Self {
        self.cache_limit = cache_limit;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::from_difficulty(Difficulty::Medium)
    }
}

/// AI 统计信息
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cache_hit_rate: f64,
    pub evaluation_count: u64,
    pub cache_size: usize,
}

/// AI 引擎
///
/// 每个实例独占自己的评估缓存和置换表。
pub struct AiEngine {
    config: AiConfig,
    evaluator: Evaluator,
    table: TranspositionTable,
    rng: ChaCha8Rng,
    nodes_searched: u64,
}

impl AiEngine {
    /// 创建新的 AI 引擎
    pub fn new(config: AiConfig) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let network = Network::random(&config.network_layers, &mut rng);
        let evaluator =
            Evaluator::with_weights(network, config.learned_weight, config.material_weight);

        Self {
            config,
            evaluator,
            table: TranspositionTable::new(),
            rng,
            nodes_searched: 0,
        }
    }

    /// 从难度创建
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self::new(AiConfig::from_difficulty(difficulty))
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    /// 按配置深度为当前走子方搜索
    pub fn search(&mut self, state: &BoardState) -> Option<Move> {
        self.best_move(state, state.current_turn, self.config.search_depth)
    }

    /// 搜索最佳走法
    ///
    /// 没有合法走法时返回 None。`depth` 为 0 时按 1 处理。
    pub fn best_move(&mut self, state: &BoardState, side: Side, depth: u8) -> Option<Move> {
        self.nodes_searched = 0;

        let mut moves = state.legal_moves(side);
        if moves.is_empty() {
            debug!("{} 没有合法走法", side);
            return None;
        }

        // 打乱走法顺序，避免自我对弈重复
        moves.shuffle(&mut self.rng);

        let child_depth = depth.saturating_sub(1);
        let mut best: Option<(Move, f64)> = None;

        for mv in moves {
            let mut child = state.clone();
            child.apply(mv);

            let score = self.minimax(
                &child,
                side,
                child_depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                false,
            );

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        debug!(
            "搜索完成: side={}, depth={}, nodes={}, best={:?}",
            side, depth, self.nodes_searched, best
        );

        self.trim_caches(self.config.cache_limit);
        best.map(|(mv, _)| mv)
    }

    /// Minimax + Alpha-Beta 搜索
    ///
    /// 分数始终以 `side` 为视角；`maximizing` 为 true 时轮到 `side` 走。
    pub fn minimax(
        &mut self,
        state: &BoardState,
        side: Side,
        depth: u8,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
    ) -> f64 {
        self.nodes_searched += 1;

        if depth == 0 {
            return self.evaluate(state, side);
        }

        if let Some(outcome) = state.outcome() {
            return self.terminal_score(state, side, outcome);
        }

        let key = SearchKey {
            hash: state.hash(),
            depth,
            maximizing,
        };
        if let Some(entry) = self.table.probe(&key) {
            if entry.usable(alpha, beta) {
                return entry.score;
            }
        }

        let mover = if maximizing { side } else { side.opponent() };
        let moves = state.legal_moves(mover);
        if moves.is_empty() {
            return self.evaluate(state, side);
        }

        let (alpha_orig, beta_orig) = (alpha, beta);
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for mv in moves {
            let mut child = state.clone();
            child.apply(mv);

            let score = self.minimax(&child, side, depth - 1, alpha, beta, !maximizing);

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(score);
            } else {
                best = best.min(score);
                beta = beta.min(score);
            }

            if beta <= alpha {
                break;
            }
        }

        let entry_type = if best <= alpha_orig {
            EntryType::UpperBound
        } else if best >= beta_orig {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };
        self.table.store(key, best, entry_type);

        best
    }

    /// 静态评估（`side` 视角）
    pub fn evaluate(&mut self, state: &BoardState, side: Side) -> f64 {
        self.evaluator.evaluate(&state.board, side)
    }

    /// 终局分数：胜负额外加减 WIN_SCORE，和棋只取评估分
    fn terminal_score(&mut self, state: &BoardState, side: Side, outcome: Outcome) -> f64 {
        let score = self.evaluate(state, side);
        match outcome.winner() {
            Some(winner) if winner == side => score + WIN_SCORE,
            Some(_) => score - WIN_SCORE,
            None => score,
        }
    }

    /// 缓存总条目数超过 `limit` 时整表清空，返回是否清空
    pub fn trim_caches(&mut self, limit: usize) -> bool {
        let size = self.cache_size();
        if size <= limit {
            return false;
        }
        debug!("缓存条目 {} 超过上限 {}，整表清空", size, limit);
        self.clear_caches();
        true
    }

    /// 清空评估缓存和置换表
    pub fn clear_caches(&mut self) {
        self.evaluator.clear_cache();
        self.table.clear();
    }

    /// 缓存总条目数
    pub fn cache_size(&self) -> usize {
        self.evaluator.cache_len() + self.table.len()
    }

    /// 获取统计信息
    pub fn stats(&self) -> AiStats {
        let eval = self.evaluator.stats();
        let tt = self.table.stats();
        let cache_hits = eval.hits + tt.hits;
        let cache_misses = eval.misses + tt.misses();
        let total = cache_hits + cache_misses;

        AiStats {
            cache_hits,
            cache_misses,
            cache_hit_rate: if total == 0 {
                0.0
            } else {
                cache_hits as f64 / total as f64
            },
            evaluation_count: eval.evaluations,
            cache_size: self.cache_size(),
        }
    }

    /// 获取上一次搜索的节点数
    pub fn nodes_searched(&self) -> u64 {
        self.nodes_searched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules::{Fen, MoveGenerator};

    fn engine(seed: u64) -> AiEngine {
        AiEngine::new(AiConfig::from_difficulty(Difficulty::Medium).with_seed(seed))
    }

    /// 不剪枝、不查表的完整 Minimax
    fn full_minimax(
        engine: &mut AiEngine,
        state: &BoardState,
        side: Side,
        depth: u8,
        maximizing: bool,
    ) -> f64 {
        if depth == 0 {
            return engine.evaluate(state, side);
        }
        if let Some(outcome) = state.outcome() {
            return engine.terminal_score(state, side, outcome);
        }

        let mover = if maximizing { side } else { side.opponent() };
        let scores = state.legal_moves(mover).into_iter().map(|mv| {
            let mut child = state.clone();
            child.apply(mv);
            full_minimax(engine, &child, side, depth - 1, !maximizing)
        });
        let scores: Vec<f64> = scores.collect();

        if maximizing {
            scores.into_iter().fold(f64::NEG_INFINITY, f64::max)
        } else {
            scores.into_iter().fold(f64::INFINITY, f64::min)
        }
    }

    #[test]
    fn test_search_initial_position() {
        let state = BoardState::initial();
        let mut engine = engine(1);

        let mv = engine.best_move(&state, Side::Red, 2).unwrap();
        assert!(state.legal_moves(Side::Red).contains(&mv));
        assert!(engine.nodes_searched() > 44);
    }

    #[test]
    fn test_depth_zero_equals_evaluation() {
        let mut engine = engine(2);
        let state = Fen::parse("3ak4/9/4b4/9/9/2C6/9/9/4R4/3K5 b 0 1").unwrap();

        for side in [Side::Red, Side::Black] {
            for maximizing in [true, false] {
                let direct = engine.evaluator.score(&state.board, side).unwrap();
                let searched = engine.minimax(
                    &state,
                    side,
                    0,
                    f64::NEG_INFINITY,
                    f64::INFINITY,
                    maximizing,
                );
                assert_eq!(searched, direct);
            }
        }
    }

    #[test]
    fn test_alpha_beta_matches_full_minimax() {
        let state = Fen::parse("4k4/4a4/9/9/9/9/9/2N6/4R4/3K5 r 0 1").unwrap();

        for depth in 1..=3 {
            let mut engine = engine(3);
            let expected = full_minimax(&mut engine, &state, Side::Red, depth, true);

            let mut engine = self::engine(3);
            let pruned = engine.minimax(
                &state,
                Side::Red,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                true,
            );
            assert_eq!(pruned, expected, "depth {}", depth);

            // 热缓存再搜一次结果不变
            let warm = engine.minimax(
                &state,
                Side::Red,
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                true,
            );
            assert_eq!(warm, expected, "warm depth {}", depth);
        }
    }

    #[test]
    fn test_finds_winning_move() {
        // 将死或困毙都直接获胜
        let state = Fen::parse("4k4/1R7/9/9/9/9/9/9/9/R2K5 r 0 1").unwrap();
        let mut engine = engine(4);

        let mv = engine.best_move(&state, Side::Red, 2).unwrap();
        let mut after = state.clone();
        after.apply(mv);

        assert!(
            MoveGenerator::is_checkmate(&after) || MoveGenerator::is_stalemate(&after),
            "{} does not end the game",
            mv
        );
        assert_eq!(after.winner(), Some(Side::Red));
    }

    #[test]
    fn test_no_move_when_mated() {
        let state = Fen::parse("R3k4/1R7/9/9/9/9/9/9/9/3K5 b 0 1").unwrap();
        assert!(state.is_game_over());

        let mut engine = engine(5);
        assert_eq!(engine.best_move(&state, Side::Black, 2), None);
        assert_eq!(engine.search(&state), None);
    }

    #[test]
    fn test_seeded_engines_agree() {
        let state = BoardState::initial();
        let mut a = engine(6);
        let mut b = engine(6);
        assert_eq!(a.best_move(&state, Side::Red, 1), b.best_move(&state, Side::Red, 1));
    }

    #[test]
    fn test_stats() {
        let state = BoardState::initial();
        let mut engine = engine(7);
        assert_eq!(engine.stats().evaluation_count, 0);

        engine.best_move(&state, Side::Red, 2);
        let stats = engine.stats();
        assert!(stats.evaluation_count > 0);
        assert!(stats.cache_misses >= stats.evaluation_count);
        assert!((0.0..=1.0).contains(&stats.cache_hit_rate));
        assert_eq!(stats.cache_size, engine.cache_size());
        assert!(stats.cache_size > 0);

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("cache_hit_rate"));
    }

    #[test]
    fn test_cache_limit_flushes() {
        let state = BoardState::initial();
        let config = AiConfig::from_difficulty(Difficulty::Medium)
            .with_seed(8)
            .with_cache_limit(10);
        let mut engine = AiEngine::new(config);

        assert!(engine.best_move(&state, Side::Red, 2).is_some());
        assert_eq!(engine.cache_size(), 0);

        let mut engine = self::engine(8);
        engine.best_move(&state, Side::Red, 1);
        let size = engine.cache_size();
        assert!(size > 0);
        assert!(!engine.trim_caches(size));
        assert!(engine.trim_caches(size - 1));
        assert_eq!(engine.cache_size(), 0);
    }

    #[test]
    fn test_broken_network_still_plays() {
        let mut config = AiConfig::from_difficulty(Difficulty::Easy).with_seed(9);
        config.network_layers = vec![99, 16, 1];
        let mut engine = AiEngine::new(config);

        let state = BoardState::initial();
        let mv = engine.search(&state).unwrap();
        assert!(state.legal_moves(Side::Red).contains(&mv));
        assert!(engine.evaluator.stats().fallbacks > 0);
    }

    #[test]
    fn test_zero_width_network_still_plays() {
        let mut config = AiConfig::from_difficulty(Difficulty::Easy).with_seed(10);
        config.network_layers = vec![DEFAULT_LAYERS[0], 0, 1];
        let mut engine = AiEngine::new(config);

        let state = BoardState::initial();
        let mv = engine.search(&state).unwrap();
        assert!(state.legal_moves(Side::Red).contains(&mv));
        assert!(engine.evaluator.stats().fallbacks > 0);
    }

    #[test]
    fn test_difficulty_config() {
        assert_eq!(AiConfig::from_difficulty(Difficulty::Easy).search_depth, 1);
        assert_eq!(AiConfig::from_difficulty(Difficulty::Medium).search_depth, 2);
        assert_eq!(AiConfig::from_difficulty(Difficulty::Hard).search_depth, 3);
        assert_eq!(AiConfig::default().cache_limit, DEFAULT_CACHE_LIMIT);
        assert_eq!(AiConfig::default().network_layers, DEFAULT_LAYERS.to_vec());
    }
}
