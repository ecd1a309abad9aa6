//! Background connection sweep.
//!
//! # Data Flow
//! ```text
//! timer.rs (one-shot deadline)
//!     → executor.rs (walk pools → lists → servers → slots)
//!         → eligible slot: Disconnected → Connecting
//!         → warn! + Connector::connect (returns immediately)
//!     → stats.rs (tick totals) + metrics
//!     → timer.rs re-arms at completion + period
//! ```
//!
//! # Design Decisions
//! - Level-triggered: a slot that stays down is retried every tick, uncapped
//! - The sweep has no error path; failures surface only as log lines
//! - Time is injected through clock.rs

pub mod clock;
pub mod executor;
pub mod stats;
pub mod timer;

pub use clock::{Clock, TokioClock};
pub use executor::{Sweep, SweepExecutor};
pub use stats::{SweepReport, SweepStats};
pub use timer::{SweepPeriod, SweepTimer};
