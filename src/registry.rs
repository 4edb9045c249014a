//! Client registry
//!
//! Ordered set of registered connections. Owned by the dispatcher task, so
//! every read and write is serialized without a lock.

use crate::client::Client;
use crate::error::HandshakeError;
use crate::types::ClientId;

/// Registered connections in registration order
///
/// Names are unique: a second registration with a taken name is refused.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Vec<Client>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection that has just completed its handshake
    pub fn register(&mut self, client: Client) -> Result<(), HandshakeError> {
        if self.contains(client.id) {
            return Err(HandshakeError::AlreadyRegistered);
        }
        if self.find_by_name(&client.name).is_some() {
            return Err(HandshakeError::NameTaken(client.name));
        }
        self.clients.push(client);
        Ok(())
    }

    /// Remove a connection; absent ids are a no-op
    pub fn unregister(&mut self, id: ClientId) -> Option<Client> {
        let pos = self.clients.iter().position(|c| c.id == id)?;
        Some(self.clients.remove(pos))
    }

    /// Point-in-time `(id, name)` pairs in registration order
    pub fn snapshot(&self) -> Vec<(ClientId, String)> {
        self.clients
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect()
    }

    /// First registered connection with this name
    pub fn find_by_name(&self, name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.name == name)
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.get(id).is_some()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        self.clients.iter().map(|c| c.name.clone()).collect()
    }

    /// Iterate registered clients in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Client> {
        self.clients.iter()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
