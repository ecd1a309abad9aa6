//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bcc_sweeps_total` (counter): completed sweep ticks
//! - `bcc_sweep_duration_seconds` (histogram): time spent inside one sweep
//! - `bcc_reconnects_triggered_total` (counter, `pool`): reconnects handed to the connector
//! - `bcc_connect_results_total` (counter, `pool`, `result`): connector outcomes
//! - `bcc_background_slots` (gauge, `state`): slots seen by the last sweep, by state
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::sweep::stats::SweepReport;

/// Install the Prometheus exporter with its HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_sweep(report: &SweepReport, elapsed: Duration) {
    counter!("bcc_sweeps_total").increment(1);
    histogram!("bcc_sweep_duration_seconds").record(elapsed.as_secs_f64());
    let disconnected = report
        .slots
        .saturating_sub(report.connected)
        .saturating_sub(report.in_flight);
    gauge!("bcc_background_slots", "state" => "connected").set(report.connected as f64);
    gauge!("bcc_background_slots", "state" => "connecting").set(report.in_flight as f64);
    gauge!("bcc_background_slots", "state" => "disconnected").set(disconnected as f64);
}

pub fn record_reconnect(pool: &str) {
    counter!("bcc_reconnects_triggered_total", "pool" => pool.to_string()).increment(1);
}

pub fn record_connect_result(pool: &str, success: bool) {
    let result = if success { "success" } else { "failure" };
    counter!("bcc_connect_results_total", "pool" => pool.to_string(), "result" => result)
        .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sweep_tolerates_inconsistent_counts() {
        let report = SweepReport {
            connected: 1,
            in_flight: 2,
            ..Default::default()
        };
        record_sweep(&report, Duration::ZERO);
    }
}
