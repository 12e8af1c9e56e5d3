use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use crate::error::RefreshError;

/// Last failed refresh cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    pub stage: &'static str,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Point-in-time copy of [`RefreshStats`], as served by the status route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub cycles_succeeded: u64,
    pub cycles_failed: u64,
    pub cycles_rejected: u64,
    pub rows_skipped_last_cycle: u64,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<FailureRecord>,
}

/// Refresh counters for observability
#[derive(Debug, Default)]
pub struct RefreshStats {
    /// Cycles that installed a snapshot
    pub cycles_succeeded: AtomicU64,
    /// Cycles aborted by a fetch, parse or normalize failure
    pub cycles_failed: AtomicU64,
    /// On-demand triggers refused because a cycle was running
    pub cycles_rejected: AtomicU64,
    rows_skipped: AtomicU64,
    last_success: RwLock<Option<DateTime<Utc>>>,
    last_error: RwLock<Option<FailureRecord>>,
}

impl RefreshStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_success(&self, rows_skipped: usize, at: DateTime<Utc>) {
        self.cycles_succeeded.fetch_add(1, Ordering::Relaxed);
        self.rows_skipped
            .store(rows_skipped as u64, Ordering::Relaxed);
        *self.last_success.write().await = Some(at);
    }

    pub async fn record_failure(&self, error: &RefreshError) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
        *self.last_error.write().await = Some(FailureRecord {
            stage: error.stage(),
            message: error.to_string(),
            at: Utc::now(),
        });
    }

    pub fn record_rejected(&self) {
        self.cycles_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles_succeeded: self.cycles_succeeded.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            cycles_rejected: self.cycles_rejected.load(Ordering::Relaxed),
            rows_skipped_last_cycle: self.rows_skipped.load(Ordering::Relaxed),
            last_success: *self.last_success.read().await,
            last_error: self.last_error.read().await.clone(),
        }
    }

    /// One-line summary for the periodic status log
    pub async fn summary(&self) -> String {
        let stats = self.snapshot().await;
        format!(
            "refreshes ok={} failed={} rejected={} skipped_rows={} last_success={}",
            stats.cycles_succeeded,
            stats.cycles_failed,
            stats.cycles_rejected,
            stats.rows_skipped_last_cycle,
            stats
                .last_success
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "never".to_string()),
        )
    }
}
