//! # Sync Metrics
//!
//! Per-run counters and timings for diagnostics. Purely informational; the
//! engine never changes behavior based on these.

use std::time::{Duration, Instant};

use crate::model::SyncRunResult;

#[derive(Debug, Clone, Default)]
pub struct SyncMetrics {
    /// Completed orchestrator runs
    pub total_runs: u64,
    /// Runs in which every attempted record succeeded
    pub clean_runs: u64,
    /// Readings confirmed remotely, across all runs
    pub records_synced: u64,
    /// Failed remote-write attempts, across all runs
    pub records_failed: u64,
    /// Duration of the most recent run
    pub last_run_duration: Option<Duration>,
    /// Rolling average run duration
    pub average_run_duration: Duration,
    last_run_start: Option<Instant>,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_run_start(&mut self) {
        self.last_run_start = Some(Instant::now());
    }

    pub fn record_run(&mut self, result: &SyncRunResult) {
        self.total_runs += 1;
        if result.failure_count == 0 {
            self.clean_runs += 1;
        }
        self.records_synced += result.success_count as u64;
        self.records_failed += result.failure_count as u64;

        if let Some(start) = self.last_run_start.take() {
            let duration = start.elapsed();
            self.last_run_duration = Some(duration);
            let total = self.average_run_duration * (self.total_runs - 1) as u32 + duration;
            self.average_run_duration = total / self.total_runs as u32;
        }
    }

    /// Fraction of runs that completed without any record failure
    pub fn clean_run_rate(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            self.clean_runs as f64 / self.total_runs as f64
        }
    }
}
