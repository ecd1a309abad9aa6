//! Sweep timer.
//!
//! # Responsibilities
//! - Arm a one-shot deadline one period from now
//! - On fire, run the sweep synchronously and record the outcome
//! - Re-arm one period after the sweep *completed*
//!
//! # Design Decisions
//! - Spacing between ticks is period + sweep run time (no catch-up ticks)
//! - The period is re-read on every re-arm, so reloads apply from the next tick
//! - The timer is an owned value created at startup, not process-global state

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::metrics;
use crate::sweep::clock::{Clock, TokioClock};
use crate::sweep::executor::Sweep;
use crate::sweep::stats::SweepStats;

/// Microseconds per second.
pub const USEC: u64 = 1_000_000;

/// Interval between sweeps, with microsecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SweepPeriod {
    usec: u64,
}

impl SweepPeriod {
    pub const fn from_micros(usec: u64) -> Self {
        Self { usec }
    }

    pub fn as_micros(self) -> u64 {
        self.usec
    }

    /// Whole seconds and the residual microseconds.
    pub fn as_parts(self) -> (u64, u32) {
        (self.usec / USEC, (self.usec % USEC) as u32)
    }

    pub fn as_duration(self) -> Duration {
        let (secs, usec) = self.as_parts();
        Duration::new(secs, usec * 1_000)
    }
}

impl std::fmt::Display for SweepPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (secs, usec) = self.as_parts();
        write!(f, "{}.{:06}s", secs, usec)
    }
}

/// Periodic driver of a [`Sweep`].
pub struct SweepTimer<S, C = TokioClock> {
    sweep: S,
    clock: C,
    period: watch::Receiver<SweepPeriod>,
    stats: Arc<SweepStats>,
}

impl<S: Sweep> SweepTimer<S, TokioClock> {
    /// Create a timer on the tokio clock. The period is read from `period` on every re-arm.
    pub fn new(sweep: S, period: watch::Receiver<SweepPeriod>) -> Self {
        Self {
            sweep,
            clock: TokioClock,
            period,
            stats: Arc::new(SweepStats::new()),
        }
    }
}

impl<S: Sweep, C: Clock> SweepTimer<S, C> {
    /// Replace the time source.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> SweepTimer<S, C2> {
        SweepTimer {
            sweep: self.sweep,
            clock,
            period: self.period,
            stats: self.stats,
        }
    }

    /// Record tick results into shared stats.
    pub fn with_stats(mut self, stats: Arc<SweepStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> Arc<SweepStats> {
        Arc::clone(&self.stats)
    }

    fn period(&self) -> SweepPeriod {
        *self.period.borrow()
    }

    /// Next deadline after a tick that completed at `completed`.
    fn rearm(&self, completed: Instant) -> Instant {
        completed + self.period().as_duration()
    }

    /// Run ticks until shutdown.
    pub async fn run(mut self, mut shutdown: ShutdownSignal) {
        let period = self.period();
        tracing::info!(
            period = %period,
            period_usec = period.as_micros(),
            "Background connection sweep scheduled"
        );

        let mut deadline = self.clock.now() + period.as_duration();

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Sweep timer received shutdown signal, exiting loop");
                    break;
                }
                _ = self.clock.sleep_until(deadline) => {}
            }

            let started = self.clock.now();
            let report = self.sweep.sweep();
            let completed = self.clock.now();
            let elapsed = completed.saturating_duration_since(started);

            self.stats.record(&report);
            metrics::record_sweep(&report, elapsed);
            tracing::debug!(
                pools = report.pools,
                servers = report.servers,
                slots = report.slots,
                triggered = report.triggered,
                in_flight = report.in_flight,
                connected = report.connected,
                elapsed_us = elapsed.as_micros() as u64,
                "Sweep tick complete"
            );

            deadline = self.rearm(completed);
        }
    }
}
