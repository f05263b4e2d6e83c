//! Branded ID newtype for connection identity.
//!
//! A [`ClientId`] is assigned when a connection is admitted and is stable for
//! the lifetime of that connection. It is never reused while the connection
//! is open and carries no meaning after disconnect. IDs are UUID v7
//! (time-ordered) generated via [`uuid::Uuid::now_v7`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a connected client.
///
/// Newtype over `String` so a client id cannot be confused with any other
/// string-shaped value. Serializes transparently as its inner string, which
/// also makes it usable as a JSON map key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Create a new random ID (UUID v7, time-ordered).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for ClientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = ClientId::new();
        let b = ClientId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_valid_uuids() {
        let id = ClientId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = ClientId::from("c1");
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json, serde_json::json!("c1"));
    }

    #[test]
    fn deserializes_from_bare_string() {
        let id: ClientId = serde_json::from_str("\"c2\"").unwrap();
        assert_eq!(id.as_str(), "c2");
    }

    #[test]
    fn display_matches_inner() {
        let id = ClientId::from("abc");
        assert_eq!(id.to_string(), "abc");
    }

    #[test]
    fn round_trips_through_string() {
        let id = ClientId::new();
        let s: String = id.clone().into();
        assert_eq!(ClientId::from(s), id);
    }
}
