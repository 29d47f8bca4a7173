//! Connection registry
//!
//! Maps identity to registered client handle. Owned by the `ChatServer`
//! actor, so it needs no internal locking.

use std::collections::HashMap;

use crate::client::Client;
use crate::types::Identity;

/// Identity → client mapping
///
/// An identity is present exactly while its connection may receive
/// broadcasts.
#[derive(Debug, Default)]
pub struct Registry {
    clients: HashMap<Identity, Client>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a client, returning any entry it replaced
    pub fn insert(&mut self, client: Client) -> Option<Client> {
        self.clients.insert(client.identity, client)
    }

    /// Remove an identity; absent identities are a no-op
    pub fn remove(&mut self, identity: Identity) -> Option<Client> {
        self.clients.remove(&identity)
    }

    pub fn get(&self, identity: Identity) -> Option<&Client> {
        self.clients.get(&identity)
    }

    pub fn get_mut(&mut self, identity: Identity) -> Option<&mut Client> {
        self.clients.get_mut(&identity)
    }

    /// Iterate over current entries (unspecified order)
    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// Identities currently registered, sorted
    pub fn snapshot(&self) -> Vec<Identity> {
        let mut ids: Vec<_> = self.clients.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn client(n: u64) -> (Client, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Client::new(Identity(n), None, tx), rx)
    }

    #[test]
    fn test_insert_and_snapshot() {
        let mut registry = Registry::new();
        let (c2, _rx2) = client(2);
        let (c1, _rx1) = client(1);

        assert!(registry.insert(c2).is_none());
        assert!(registry.insert(c1).is_none());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot(), vec![Identity(1), Identity(2)]);
        assert!(registry.get(Identity(1)).is_some());
    }

    #[test]
    fn test_insert_overwrites_collision() {
        let mut registry = Registry::new();
        let (first, _rx1) = client(1);
        let (mut second, _rx2) = client(1);
        second.set_display_name("second".to_string());

        registry.insert(first);
        let replaced = registry.insert(second);

        assert!(replaced.is_some_and(|c| c.display_name.is_none()));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(Identity(1)).and_then(|c| c.display_name.as_deref()),
            Some("second")
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = Registry::new();
        let (c1, _rx1) = client(1);
        registry.insert(c1);

        assert!(registry.remove(Identity(1)).is_some());
        assert!(registry.remove(Identity(1)).is_none());
        assert!(registry.remove(Identity(99)).is_none());
        assert!(registry.is_empty());
        assert!(registry.get(Identity(1)).is_none());
    }
}
