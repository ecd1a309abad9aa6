//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Sweep timer, executor, connector produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every triggered reconnect is a WARN line naming pool, server and slot
//! - Metrics are optional; the sweep works the same without a recorder

pub mod logging;
pub mod metrics;
