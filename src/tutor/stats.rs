//! 使用统计
//!
//! 原子计数器实现，跨请求共享无需加锁。

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 系统使用统计
#[derive(Debug, Default)]
pub struct SystemStats {
    total_queries: AtomicU64,
    successful_responses: AtomicU64,
    failed_responses: AtomicU64,
    documents_loaded: AtomicU64,
}

/// 统计快照（序列化用）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatsSnapshot {
    /// 总提问数
    pub total_queries: u64,
    /// 成功应答数
    pub successful_responses: u64,
    /// 失败应答数
    pub failed_responses: u64,
    /// 已索引内容块数
    pub documents_loaded: u64,
}

impl SystemStats {
    /// 记录一次提问
    pub fn record_query(&self) {
        self.total_queries.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录一次成功应答
    pub fn record_success(&self) {
        self.successful_responses.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录一次失败应答
    pub fn record_failure(&self) {
        self.failed_responses.fetch_add(1, Ordering::SeqCst);
    }

    /// 记录新索引的内容块数量
    pub fn record_documents(&self, count: u64) {
        self.documents_loaded.fetch_add(count, Ordering::SeqCst);
    }

    /// 当前总提问数
    pub fn total_queries(&self) -> u64 {
        self.total_queries.load(Ordering::SeqCst)
    }

    /// 导出快照
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_queries: self.total_queries.load(Ordering::SeqCst),
            successful_responses: self.successful_responses.load(Ordering::SeqCst),
            failed_responses: self.failed_responses.load(Ordering::SeqCst),
            documents_loaded: self.documents_loaded.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counters() {
        let stats = SystemStats::default();
        stats.record_query();
        stats.record_query();
        stats.record_success();
        stats.record_failure();
        stats.record_documents(12);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_queries, 2);
        assert_eq!(snapshot.successful_responses, 1);
        assert_eq!(snapshot.failed_responses, 1);
        assert_eq!(snapshot.documents_loaded, 12);
    }
}
