//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Honor `RUST_LOG` first, the configured level otherwise

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_filter(level: &str) -> String {
    format!("bcc_sweeper={level},tower_http={level}")
}

/// Install the global subscriber.
pub fn init(level: &str) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_covers_crate_and_http() {
        let filter = default_filter("warn");
        assert_eq!(filter, "bcc_sweeper=warn,tower_http=warn");
        assert!(filter.parse::<EnvFilter>().is_ok());
    }
}
