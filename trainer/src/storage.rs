//! 训练数据存储
//!
//! 所有文件以 JSON 写入输出目录

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::record::{AiStatsReport, GameStats, MoveRecord};

/// 汇总统计文件名
pub const STATS_FILE: &str = "stats.json";
/// AI 统计文件名
pub const AI_STATS_FILE: &str = "ai_stats.json";

/// 存储管理器
pub struct TrainingStorage {
    output_dir: PathBuf,
    training_file: PathBuf,
}

impl TrainingStorage {
    /// 创建存储管理器，训练数据文件名带启动时间戳
    pub fn new(output_dir: impl Into<PathBuf>, started_at: &DateTime<Utc>) -> Result<Self> {
        let output_dir = output_dir.into();

        if !output_dir.exists() {
            fs::create_dir_all(&output_dir)
                .with_context(|| format!("无法创建输出目录: {:?}", output_dir))?;
        }

        let training_file = output_dir.join(training_filename(started_at));
        Ok(Self {
            output_dir,
            training_file,
        })
    }

    /// 写入全部训练数据（覆盖）
    pub fn save_training(&self, records: &[MoveRecord]) -> Result<()> {
        write_json(&self.training_file, records).context("保存训练数据失败")
    }

    pub fn save_stats(&self, stats: &GameStats) -> Result<()> {
        write_json(&self.output_dir.join(STATS_FILE), stats).context("保存统计信息失败")
    }

    pub fn save_ai_stats(&self, report: &AiStatsReport) -> Result<()> {
        write_json(&self.output_dir.join(AI_STATS_FILE), report).context("保存 AI 统计失败")
    }

    /// 读取训练数据
    pub fn load_training(&self) -> Result<Vec<MoveRecord>> {
        let content = fs::read_to_string(&self.training_file)
            .with_context(|| format!("读取文件失败: {:?}", self.training_file))?;

        serde_json::from_str(&content).context("解析训练数据失败")
    }

    pub fn training_file(&self) -> &Path {
        &self.training_file
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

/// 生成训练数据文件名
fn training_filename(timestamp: &DateTime<Utc>) -> String {
    format!("training_{}.json", timestamp.format("%Y%m%d_%H%M%S"))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).context("序列化失败")?;

    fs::write(path, content).with_context(|| format!("写入文件失败: {:?}", path))
}
