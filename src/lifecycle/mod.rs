//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build pool registry → Start sweep timer
//!     → Start optional metrics exporter, admin API, config watcher
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Trigger shutdown → Timer and servers exit → Join tasks
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Exactly one sweep timer per service, owned by the service value
//! - Fail fast: any startup error is fatal
//! - Shutdown is sticky so late subscribers still stop

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{Service, StartupError};
