//! Authoritative registry of connected clients.
//!
//! The registry is a thin map from [`ClientId`] to last-known [`Position`].
//! It performs no locking of its own: the hub owns it inside a single
//! critical section together with the connection set, so every mutation and
//! every snapshot happens at one consistent instant. Invariant: an id is
//! present iff its connection is currently open.

use std::collections::HashMap;

use beacon_core::{ClientId, Position, RegistryError};

/// Map of every open connection's id to its last-known position.
#[derive(Debug, Default)]
pub struct Registry {
    clients: HashMap<ClientId, Position>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly connected client.
    ///
    /// Double-insert is an invariant violation and is refused rather than
    /// overwriting the existing entry.
    pub fn insert(&mut self, id: ClientId, position: Position) -> Result<(), RegistryError> {
        if self.clients.contains_key(&id) {
            return Err(RegistryError::DuplicateClient { id });
        }
        let _ = self.clients.insert(id, position);
        Ok(())
    }

    /// Replace the stored position for `id` wholesale (last-write-wins).
    ///
    /// Returns `false` when the id is not registered — a stray message can
    /// arrive after disconnect, which is benign and left to the caller to
    /// log.
    pub fn update(&mut self, id: &ClientId, position: Position) -> bool {
        match self.clients.get_mut(id) {
            Some(slot) => {
                *slot = position;
                true
            }
            None => false,
        }
    }

    /// Remove a client. Returns the last stored position, or `None` when the
    /// id was already absent (disconnect may race transport teardown).
    pub fn remove(&mut self, id: &ClientId) -> Option<Position> {
        self.clients.remove(id)
    }

    /// Last-known position for `id`.
    #[must_use]
    pub fn get(&self, id: &ClientId) -> Option<Position> {
        self.clients.get(id).copied()
    }

    /// Whether `id` is currently registered.
    #[must_use]
    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    /// Full mapping at a single consistent instant.
    ///
    /// Used solely for the init message sent to a newly admitted client;
    /// taken after that client's own insert so its entry is included.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<ClientId, Position> {
        self.clients.clone()
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
