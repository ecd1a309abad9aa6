//! Connection identity for server links and background sockets.
//!
//! A background slot can be reconnected many times over the life of its
//! server. Each socket gets a fresh id so that a close reported late by an
//! old socket's watcher never clears the socket that replaced it.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(NonZeroU64);

impl ConnectionId {
    pub fn new() -> Self {
        let raw = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bcc#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let first = ConnectionId::new();
        let second = ConnectionId::new();
        assert!(second > first);
        assert_ne!(first, second);
    }

    #[test]
    fn test_display_has_prefix() {
        let id = ConnectionId::new();
        assert_eq!(id.to_string(), format!("bcc#{}", id.get()));
    }
}
