//! Error types for the relay core.
//!
//! Two families, both built on [`thiserror`]:
//!
//! - [`RegistryError`]: violations of the registry invariant (a client id is
//!   present iff its connection is open). These indicate a bug in the hub,
//!   not bad client input.
//! - [`ProtocolError`]: bad input from a client. Contained to that client's
//!   connection, never fatal to the process or to other sessions.

use thiserror::Error;

use crate::ids::ClientId;

/// Registry invariant violation.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// An insert was attempted for an id that is already registered.
    ///
    /// Double-insert would silently overwrite live state, so it is surfaced
    /// instead of absorbed. Ids are generated per connection and never
    /// reused while open, so this cannot happen under normal operation.
    #[error("client {id} is already registered")]
    DuplicateClient {
        /// The id that was already present.
        id: ClientId,
    },
}

/// Bad input on a client connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON, or did not match any known message
    /// shape. The frame is dropped; the connection stays up.
    #[error("malformed client frame: {reason}")]
    Malformed {
        /// What the parser objected to.
        reason: String,
    },

    /// The frame was a binary frame; the protocol is text-only JSON.
    #[error("unexpected binary frame ({len} bytes)")]
    BinaryFrame {
        /// Size of the rejected frame.
        len: usize,
    },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn duplicate_client_mentions_id() {
        let err = RegistryError::DuplicateClient {
            id: ClientId::from("c1"),
        };
        assert!(err.to_string().contains("c1"));
    }

    #[test]
    fn malformed_from_serde_error() {
        let parse_err = serde_json::from_str::<crate::protocol::ClientMessage>("not json")
            .unwrap_err();
        let err = ProtocolError::from(parse_err);
        assert_matches!(err, ProtocolError::Malformed { .. });
        assert!(err.to_string().starts_with("malformed client frame"));
    }

    #[test]
    fn binary_frame_reports_size() {
        let err = ProtocolError::BinaryFrame { len: 16 };
        assert!(err.to_string().contains("16"));
    }

    #[test]
    fn errors_are_std_errors() {
        let reg = RegistryError::DuplicateClient {
            id: ClientId::from("c"),
        };
        let proto = ProtocolError::BinaryFrame { len: 0 };
        let _: &dyn std::error::Error = &reg;
        let _: &dyn std::error::Error = &proto;
    }
}
