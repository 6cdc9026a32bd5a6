//! 置换表
//!
//! 缓存已搜索过的局面。条目数超过上限时整表清空，不做逐条淘汰。

use rustc_hash::FxHashMap;

/// 置换表条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// 精确值
    Exact,
    /// 下界（Beta 截断）
    LowerBound,
    /// 上界（Alpha 截断）
    UpperBound,
}

/// 置换表键：搜索值依赖剩余深度和极大/极小层
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchKey {
    /// 局面哈希（含走子方）
    pub hash: u64,
    /// 剩余深度
    pub depth: u8,
    /// 是否为极大层
    pub maximizing: bool,
}

/// 置换表条目
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTEntry {
    /// 搜索分数
    pub score: f64,
    /// 条目类型
    pub entry_type: EntryType,
}

impl TTEntry {
    /// 在给定窗口下该条目是否可以直接作为结果
    pub fn usable(&self, alpha: f64, beta: f64) -> bool {
        match self.entry_type {
            EntryType::Exact => true,
            EntryType::LowerBound => self.score >= beta,
            EntryType::UpperBound => self.score <= alpha,
        }
    }
}

/// 置换表
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: FxHashMap<SearchKey, TTEntry>,
    /// 命中次数
    hits: u64,
    /// 查询次数
    probes: u64,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询条目
    pub fn probe(&mut self, key: &SearchKey) -> Option<TTEntry> {
        self.probes += 1;
        let entry = self.entries.get(key).copied();
        if entry.is_some() {
            self.hits += 1;
        }
        entry
    }

    /// 存储条目（同键覆盖）
    pub fn store(&mut self, key: SearchKey, score: f64, entry_type: EntryType) {
        self.entries.insert(key, TTEntry { score, entry_type });
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空表（保留统计）
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 获取统计信息
    pub fn stats(&self) -> TTStats {
        TTStats {
            entries: self.entries.len(),
            hits: self.hits,
            probes: self.probes,
        }
    }
}

/// 置换表统计信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TTStats {
    pub entries: usize,
    pub hits: u64,
    pub probes: u64,
}

impl TTStats {
    pub fn misses(&self) -> u64 {
        self.probes - self.hits
    }

    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(hash: u64, depth: u8, maximizing: bool) -> SearchKey {
        SearchKey {
            hash,
            depth,
            maximizing,
        }
    }

    #[test]
    fn test_tt_store_and_probe() {
        let mut tt = TranspositionTable::new();
        let k = key(0x1234567890ABCDEF, 3, true);
        tt.store(k, 12.5, EntryType::Exact);

        let entry = tt.probe(&k).unwrap();
        assert_eq!(entry.score, 12.5);
        assert_eq!(entry.entry_type, EntryType::Exact);
        assert_eq!(tt.stats().hits, 1);
    }

    #[test]
    fn test_key_includes_depth_and_node_type() {
        let mut tt = TranspositionTable::new();
        tt.store(key(42, 3, true), 1.0, EntryType::Exact);

        assert!(tt.probe(&key(42, 2, true)).is_none());
        assert!(tt.probe(&key(42, 3, false)).is_none());
        assert!(tt.probe(&key(43, 3, true)).is_none());

        let stats = tt.stats();
        assert_eq!(stats.probes, 3);
        assert_eq!(stats.misses(), 3);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_bound_usability() {
        let exact = TTEntry {
            score: 5.0,
            entry_type: EntryType::Exact,
        };
        assert!(exact.usable(10.0, 20.0));

        let lower = TTEntry {
            score: 5.0,
            entry_type: EntryType::LowerBound,
        };
        assert!(lower.usable(0.0, 4.0));
        assert!(!lower.usable(0.0, 6.0));

        let upper = TTEntry {
            score: 5.0,
            entry_type: EntryType::UpperBound,
        };
        assert!(upper.usable(6.0, 10.0));
        assert!(!upper.usable(4.0, 10.0));
    }

    #[test]
    fn test_clear() {
        let mut tt = TranspositionTable::new();
        for i in 0..10 {
            tt.store(key(i, 1, false), i as f64, EntryType::Exact);
        }
        assert_eq!(tt.len(), 10);

        tt.clear();
        assert!(tt.is_empty());
    }
}
