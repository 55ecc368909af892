//! Categorization outcome counters and the summary event built from them.

use serde::Serialize;
use std::ops::AddAssign;
use tracing::info;

/// Per-batch outcome counters.
///
/// Every transaction lands in exactly one bucket, so
/// `successful + failed + uncategorized == total` after each `record_*`.
/// Single-owner: parallel workers keep one each and [`merge`](Self::merge)
/// at the end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorizationStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub uncategorized: usize,
}

impl CategorizationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.total += 1;
        self.successful += 1;
    }

    pub fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    pub fn record_uncategorized(&mut self) {
        self.total += 1;
        self.uncategorized += 1;
    }

    /// Percentage of `total` that was categorized; `0.0` for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.successful as f64 / self.total as f64 * 100.0
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.successful + self.failed + self.uncategorized == self.total
    }

    /// Sum another worker's counters into this one.
    pub fn merge(&mut self, other: &CategorizationStats) {
        self.total += other.total;
        self.successful += other.successful;
        self.failed += other.failed;
        self.uncategorized += other.uncategorized;
    }

    pub fn summary(&self, parser_type: &str) -> CategorizationSummary {
        CategorizationSummary {
            parser_type: parser_type.to_string(),
            total_transactions: self.total,
            successful: self.successful,
            failed: self.failed,
            uncategorized: self.uncategorized,
            success_rate: self.success_rate(),
        }
    }
}

impl AddAssign for CategorizationStats {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}

/// Snapshot emitted once per batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizationSummary {
    pub parser_type: String,
    pub total_transactions: usize,
    pub successful: usize,
    pub failed: usize,
    pub uncategorized: usize,
    pub success_rate: f64,
}

impl CategorizationSummary {
    /// Emit as the "Categorization summary" event on the current subscriber.
    pub fn log(&self) {
        info!(
            parser_type = %self.parser_type,
            total_transactions = self.total_transactions,
            successful = self.successful,
            failed = self.failed,
            uncategorized = self.uncategorized,
            success_rate = self.success_rate,
            "Categorization summary"
        );
    }
}
