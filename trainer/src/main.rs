use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trainer::{SelfPlayTrainer, TrainerConfig, TrainingStorage};

/// 中国象棋 AI 后台训练程序
#[derive(Debug, Parser)]
#[command(name = "trainer", version)]
struct Args {
    /// 训练时长（秒），默认不限
    #[arg(long)]
    duration: Option<u64>,

    /// 最大对局数，默认不限
    #[arg(long)]
    max_games: Option<u32>,

    /// AI 搜索深度
    #[arg(long, default_value_t = 1)]
    depth: u8,

    /// 输出目录
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,

    /// 每隔多少局保存一次
    #[arg(long, default_value_t = 10)]
    save_every: u32,

    /// 保存后 AI 缓存条目上限
    #[arg(long, default_value_t = 50_000)]
    cache_limit: usize,

    /// 每局最大步数
    #[arg(long, default_value_t = rules::MAX_MOVES)]
    max_moves: u32,

    /// 随机种子
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("trainer=info".parse()?))
        .init();

    let args = Args::parse();
    info!("中国象棋 AI 训练程序启动: {:?}", args);

    let config = TrainerConfig {
        duration: args.duration.map(Duration::from_secs),
        max_games: args.max_games,
        search_depth: args.depth,
        save_every: args.save_every,
        cache_limit: args.cache_limit,
        max_moves: args.max_moves,
        seed: args.seed,
    };

    let storage = TrainingStorage::new(&args.output_dir, &chrono::Utc::now())?;
    let mut trainer = SelfPlayTrainer::new(config, storage);

    let stop = trainer.stop_handle();
    ctrlc::set_handler(move || {
        info!("检测到 Ctrl+C，正在保存数据...");
        stop.store(true, Ordering::SeqCst);
    })
    .context("无法注册 Ctrl+C 处理器")?;

    trainer.run()?;
    Ok(())
}
