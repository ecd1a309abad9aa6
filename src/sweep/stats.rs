//! Sweep counters shared with the admin API.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::Serialize;

/// Summary of one sweep tick.
///
/// Purely informational: a sweep has no failure outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Pools visited.
    pub pools: usize,
    /// Server connections visited across all four lists.
    pub servers: usize,
    /// Background slots inspected.
    pub slots: usize,
    /// Reconnects handed to the connector.
    pub triggered: usize,
    /// Slots skipped because an attempt was already in flight.
    pub in_flight: usize,
    /// Slots with a live socket.
    pub connected: usize,
}

/// Running totals across ticks.
#[derive(Debug, Default)]
pub struct SweepStats {
    ticks: AtomicU64,
    triggered: AtomicU64,
    last: Mutex<Option<SweepReport>>,
}

impl SweepStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, report: &SweepReport) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.triggered
            .fetch_add(report.triggered as u64, Ordering::Relaxed);
        *self.last.lock() = Some(*report);
    }

    /// Completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Reconnects triggered since startup.
    pub fn triggered(&self) -> u64 {
        self.triggered.load(Ordering::Relaxed)
    }

    pub fn last(&self) -> Option<SweepReport> {
        *self.last.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_accumulate() {
        let stats = SweepStats::new();
        assert_eq!(stats.ticks(), 0);
        assert!(stats.last().is_none());

        let first = SweepReport {
            pools: 1,
            servers: 3,
            slots: 3,
            triggered: 1,
            connected: 2,
            ..Default::default()
        };
        let second = SweepReport {
            in_flight: 1,
            triggered: 0,
            ..first
        };
        stats.record(&first);
        stats.record(&second);

        assert_eq!(stats.ticks(), 2);
        assert_eq!(stats.triggered(), 1);
        assert_eq!(stats.last(), Some(second));
    }
}
