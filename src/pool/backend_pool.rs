//! Server pool with lifecycle lists.
//!
//! # Responsibilities
//! - Group server connections of one logical route under a name
//! - Track each server in exactly one of four lists (active/idle/used/tested)
//! - Hand out insertion-ordered snapshots for traversal

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::net::connection::ConnectionId;
use crate::pool::server::ServerConnection;

/// Lifecycle list a server connection is tracked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerList {
    Active,
    #[default]
    Idle,
    Used,
    Tested,
}

impl ServerList {
    /// All lists in sweep order.
    pub const ALL: [ServerList; 4] = [
        ServerList::Active,
        ServerList::Idle,
        ServerList::Used,
        ServerList::Tested,
    ];

    fn slot(self) -> usize {
        match self {
            ServerList::Active => 0,
            ServerList::Idle => 1,
            ServerList::Used => 2,
            ServerList::Tested => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServerList::Active => "active",
            ServerList::Idle => "idle",
            ServerList::Used => "used",
            ServerList::Tested => "tested",
        }
    }
}

impl std::fmt::Display for ServerList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of server connections serving one route.
#[derive(Debug)]
pub struct Pool {
    name: Arc<str>,
    lists: RwLock<[Vec<Arc<ServerConnection>>; 4]>,
}

impl Pool {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            lists: RwLock::new(Default::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared name, for building servers that point back at this pool.
    pub fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Append a server to the tail of `list`.
    pub fn attach(&self, list: ServerList, server: Arc<ServerConnection>) {
        self.lists.write()[list.slot()].push(server);
    }

    /// Remove a server from whichever list holds it.
    pub fn detach(&self, id: ConnectionId) -> Option<Arc<ServerConnection>> {
        let mut lists = self.lists.write();
        let (list, pos) = locate(&lists, id)?;
        Some(lists[list].remove(pos))
    }

    /// Move a server to the tail of `to`. Returns false if the server is unknown.
    pub fn move_to(&self, id: ConnectionId, to: ServerList) -> bool {
        let mut lists = self.lists.write();
        let Some((list, pos)) = locate(&lists, id) else {
            return false;
        };
        let server = lists[list].remove(pos);
        lists[to.slot()].push(server);
        true
    }

    /// Which list currently holds the server.
    pub fn list_of(&self, id: ConnectionId) -> Option<ServerList> {
        let lists = self.lists.read();
        ServerList::ALL
            .into_iter()
            .find(|list| lists[list.slot()].iter().any(|s| s.id() == id))
    }

    /// Insertion-ordered copy of one list.
    pub fn servers(&self, list: ServerList) -> Vec<Arc<ServerConnection>> {
        self.lists.read()[list.slot()].clone()
    }

    /// Total servers across all lists.
    pub fn len(&self) -> usize {
        self.lists.read().iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn locate(lists: &[Vec<Arc<ServerConnection>>; 4], id: ConnectionId) -> Option<(usize, usize)> {
    lists.iter().enumerate().find_map(|(list, servers)| {
        servers
            .iter()
            .position(|s| s.id() == id)
            .map(|pos| (list, pos))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::slot::BackgroundSlots;

    fn server(pool: &Pool, name: &str) -> Arc<ServerConnection> {
        Arc::new(ServerConnection::new(
            pool.name_arc(),
            name,
            "127.0.0.1:5432",
            BackgroundSlots::from_targets(["127.0.0.1:5433"]),
        ))
    }

    #[test]
    fn test_attach_preserves_insertion_order() {
        let pool = Pool::new("main");
        let a = server(&pool, "a");
        let b = server(&pool, "b");
        pool.attach(ServerList::Idle, a.clone());
        pool.attach(ServerList::Idle, b.clone());

        let names: Vec<String> = pool
            .servers(ServerList::Idle)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(pool.servers(ServerList::Active).is_empty());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_move_and_detach() {
        let pool = Pool::new("main");
        let a = server(&pool, "a");
        pool.attach(ServerList::Idle, a.clone());

        assert!(pool.move_to(a.id(), ServerList::Active));
        assert_eq!(pool.list_of(a.id()), Some(ServerList::Active));
        assert!(pool.servers(ServerList::Idle).is_empty());

        let removed = pool.detach(a.id()).unwrap();
        assert_eq!(removed.id(), a.id());
        assert!(pool.is_empty());
        assert!(!pool.move_to(a.id(), ServerList::Used));
        assert!(pool.detach(a.id()).is_none());
    }

    #[test]
    fn test_server_list_names() {
        let names: Vec<&str> = ServerList::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(names, vec!["active", "idle", "used", "tested"]);
        assert_eq!(ServerList::default(), ServerList::Idle);
    }
}
