//! Server connection abstraction.
//!
//! # Responsibilities
//! - Represent a single backend link tracked by a pool
//! - Own the background slot set of that link
//! - Carry the identity used in reconnect logs

use std::sync::Arc;

use crate::net::connection::ConnectionId;
use crate::pool::slot::{BackgroundSlot, BackgroundSlots, SlotIndex, SlotSet};

/// A backend link and its background slots.
#[derive(Debug)]
pub struct ServerConnection {
    id: ConnectionId,
    /// Server name from configuration.
    name: String,
    /// Primary backend address.
    address: String,
    /// Name of the owning pool.
    pool: Arc<str>,
    slots: BackgroundSlots,
}

impl ServerConnection {
    pub fn new(
        pool: impl Into<Arc<str>>,
        name: impl Into<String>,
        address: impl Into<String>,
        slots: impl Into<BackgroundSlots>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            name: name.into(),
            address: address.into(),
            pool: pool.into(),
            slots: slots.into(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Name of the pool this server belongs to.
    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn slots(&self) -> &BackgroundSlots {
        &self.slots
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&BackgroundSlot> {
        self.slots.get(index)
    }

    /// `pool/server` label for logs.
    pub fn identity(&self) -> String {
        format!("{}/{}", self.pool, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_identity_and_slots() {
        let server = ServerConnection::new(
            "main",
            "primary",
            "10.0.0.1:5432",
            BackgroundSlots::from_targets(["10.0.0.2:5432", "10.0.0.3:5432"]),
        );
        assert_eq!(server.identity(), "main/primary");
        assert_eq!(server.pool(), "main");
        assert_eq!(server.slots().len(), 2);
        assert_eq!(server.slot(Some(1)).map(|s| s.target()), Some("10.0.0.3:5432"));
        assert!(server.slot(None).is_none());
    }
}
