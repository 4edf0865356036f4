//! Per-session emit counters.

use crate::emitter::CycleReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for the current emitter session.
#[derive(Debug)]
pub struct EmitterStats {
    /// Number of completed cycles
    cycles: AtomicU64,
    /// Number of readings attempted
    readings_sent: AtomicU64,
    /// Responses with status 201
    delivered: AtomicU64,
    /// Responses with any other status
    rejected: AtomicU64,
    /// Requests that never got a response
    failed: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl EmitterStats {
    /// Create a new, zeroed counter set.
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            readings_sent: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    /// Fold one cycle's outcomes into the counters.
    pub fn record_cycle(&self, report: &CycleReport) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        self.readings_sent
            .fetch_add(report.len() as u64, Ordering::Relaxed);
        self.delivered
            .fetch_add(report.delivered() as u64, Ordering::Relaxed);
        self.rejected
            .fetch_add(report.rejected() as u64, Ordering::Relaxed);
        self.failed
            .fetch_add(report.failed() as u64, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            readings_sent: self.readings_sent.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Cycles completed: {}\n\
             - Readings sent: {}\n\
             - Delivered (201): {}\n\
             - Rejected (other status): {}\n\
             - Failed to send: {}\n\
             - Session duration: {} seconds",
            stats.cycles,
            stats.readings_sent,
            stats.delivered,
            stats.rejected,
            stats.failed,
            stats.session_duration_secs
        )
    }
}

impl Default for EmitterStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub cycles: u64,
    pub readings_sent: u64,
    pub delivered: u64,
    pub rejected: u64,
    pub failed: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared stats, readable from the interrupt path.
pub type SharedEmitterStats = Arc<EmitterStats>;

/// Create a new shared stats handle.
pub fn create_shared_stats() -> SharedEmitterStats {
    Arc::new(EmitterStats::new())
}
