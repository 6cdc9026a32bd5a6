//! 自我对弈训练
//!
//! 红黑两个 AI 引擎轮流走子，直到达到局数、时长上限或收到中断信号。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chess_ai::{AiConfig, AiEngine, Difficulty};
use chrono::Utc;
use rules::{BoardState, Side, MAX_MOVES};
use tracing::{debug, info};

use crate::record::{AiStatsReport, GameStats, MoveRecord, StopReason};
use crate::storage::TrainingStorage;

/// 训练配置
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    /// 训练时长，None 表示不限
    pub duration: Option<Duration>,
    /// 最大对局数，None 表示不限
    pub max_games: Option<u32>,
    pub search_depth: u8,
    /// 每隔多少局保存一次
    pub save_every: u32,
    /// 保存后缓存条目超过该值则清空
    pub cache_limit: usize,
    pub max_moves: u32,
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            duration: None,
            max_games: None,
            search_depth: 1,
            save_every: 10,
            cache_limit: 50_000,
            max_moves: MAX_MOVES,
            seed: None,
        }
    }
}

/// 自我对弈训练器
pub struct SelfPlayTrainer {
    config: TrainerConfig,
    red: AiEngine,
    black: AiEngine,
    storage: TrainingStorage,
    records: Vec<MoveRecord>,
    stats: GameStats,
    stop: Arc<AtomicBool>,
}

impl SelfPlayTrainer {
    pub fn new(config: TrainerConfig, storage: TrainingStorage) -> Self {
        let red = AiEngine::new(engine_config(&config, 0));
        let black = AiEngine::new(engine_config(&config, 1));

        Self {
            config,
            red,
            black,
            storage,
            records: Vec::new(),
            stats: GameStats::new(Utc::now()),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 中断标志，置位后训练在当前走法结束时停止
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// 运行训练直到满足停止条件，结束时保存全部数据
    pub fn run(&mut self) -> Result<&GameStats> {
        info!(
            "自我对弈开始: depth={}, 输出文件={:?}",
            self.config.search_depth,
            self.storage.training_file()
        );

        let started = Instant::now();
        let mut game_id = 0;

        let stop_reason = loop {
            if let Some(reason) = self.should_stop(started, game_id) {
                break reason;
            }

            game_id += 1;
            let game_start = Instant::now();
            let Some(records) = self.play_game(game_id) else {
                info!("检测到中断信号，放弃第 {} 局", game_id);
                break StopReason::UserInterrupt;
            };

            let winner = match records.first().map(|r| r.result.as_str()) {
                Some("red") => Some(Side::Red),
                Some("black") => Some(Side::Black),
                _ => None,
            };
            self.stats.record_game(winner, records.len());
            self.records.extend(records);

            debug!(
                "第 {} 局结束: winner={:?}, 耗时 {:.2}s",
                game_id,
                winner,
                game_start.elapsed().as_secs_f64()
            );

            if game_id % self.config.save_every.max(1) == 0 {
                self.save()?;
                self.log_progress();
            }
        };

        self.stats.finish(Utc::now(), stop_reason);
        self.save()?;
        self.log_final_stats();

        Ok(&self.stats)
    }

    /// 对弈一局，收到中断信号时返回 None
    pub fn play_game(&mut self, game_id: u32) -> Option<Vec<MoveRecord>> {
        let mut state = BoardState::initial().with_move_limit(self.config.max_moves);
        let mut records = Vec::new();

        while !state.is_game_over() {
            if self.stop.load(Ordering::SeqCst) {
                return None;
            }

            let side = state.current_turn;
            let engine = match side {
                Side::Red => &mut self.red,
                Side::Black => &mut self.black,
            };
            let Some(mv) = engine.search(&state) else {
                break;
            };

            let board_state = *state.board.cells();
            let piece_type = state.board.get(mv.from).map_or(0, |p| p.piece_type.code() as u8);
            let captured_piece = state.board.get(mv.to).map_or(0, |p| p.piece_type.code() as u8);

            state.apply(mv);

            records.push(MoveRecord {
                game_id,
                move_number: records.len() as u32 + 1,
                player: side,
                board_state,
                mv: mv.to_coords(),
                piece_type,
                captured_piece,
                result: String::new(),
            });
        }

        let result = state.outcome().map_or("draw", |outcome| outcome.label());
        for record in &mut records {
            record.result = result.to_string();
        }

        Some(records)
    }

    fn should_stop(&self, started: Instant, games: u32) -> Option<StopReason> {
        if self.stop.load(Ordering::SeqCst) {
            return Some(StopReason::UserInterrupt);
        }

        if let Some(duration) = self.config.duration {
            if started.elapsed() >= duration {
                info!("训练时间已到，准备停止");
                return Some(StopReason::TimeLimit);
            }
        }

        if let Some(max_games) = self.config.max_games {
            if games >= max_games {
                info!("已达到最大对局数，准备停止");
                return Some(StopReason::GameLimit);
            }
        }

        None
    }

    /// 保存训练数据和统计，然后清理过大的缓存
    fn save(&mut self) -> Result<()> {
        self.storage.save_training(&self.records)?;
        self.storage.save_stats(&self.stats)?;
        self.storage.save_ai_stats(&AiStatsReport {
            red: self.red.stats(),
            black: self.black.stats(),
        })?;

        let limit = self.config.cache_limit;
        if self.red.trim_caches(limit) {
            debug!("红方缓存已清空");
        }
        if self.black.trim_caches(limit) {
            debug!("黑方缓存已清空");
        }

        Ok(())
    }

    fn log_progress(&self) {
        let stats = &self.stats;
        info!(
            "已完成 {} 局, 红胜率 {:.1}%, 黑胜率 {:.1}%, 和棋 {}, 缓存命中率 {:.2}%",
            stats.total_games,
            stats.win_rate(Side::Red) * 100.0,
            stats.win_rate(Side::Black) * 100.0,
            stats.draws,
            self.red.stats().cache_hit_rate * 100.0
        );
    }

    fn log_final_stats(&self) {
        let stats = &self.stats;
        info!(
            "训练结束: 总局数 {}, 总步数 {}, 平均每局 {:.1} 步, 红胜 {}, 黑胜 {}, 和棋 {}, 耗时 {:.1}s, 停止原因 {:?}",
            stats.total_games,
            stats.total_moves,
            stats.average_moves(),
            stats.red_wins,
            stats.black_wins,
            stats.draws,
            stats.total_time,
            stats.stop_reason
        );
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }
}

fn engine_config(config: &TrainerConfig, offset: u64) -> AiConfig {
    let ai = AiConfig::from_difficulty(Difficulty::Easy).with_depth(config.search_depth);
    match config.seed {
        Some(seed) => ai.with_seed(seed.wrapping_add(offset)),
        None => ai,
    }
}
