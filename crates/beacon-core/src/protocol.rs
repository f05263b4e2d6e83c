//! Wire protocol for the relay.
//!
//! Two message families, both JSON with a `"type"` tag:
//!
//! - **[`ClientMessage`]**: inbound frames from a connected client
//!   (move, target hit, chat).
//! - **[`ServerMessage`]**: outbound frames fanned out to clients
//!   (init snapshot, join/leave notices, relayed state and chat).
//!
//! The protocol is transport-agnostic: any duplex channel that delivers
//! discrete frames reliably and in per-connection order can carry it.
//! Clients rely on exact type strings and field names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::ClientId;
use crate::position::Position;

// ─────────────────────────────────────────────────────────────────────────────
// ClientMessage — inbound frames
// ─────────────────────────────────────────────────────────────────────────────

/// A frame received from a connected client.
///
/// Shape is validated at the boundary: a frame that does not deserialize
/// into one of these variants is rejected as malformed, never stored or
/// relayed opaquely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Position update. Replaces the sender's stored state wholesale.
    #[serde(rename = "move")]
    Move {
        /// New horizontal coordinate.
        x: f64,
        /// New vertical coordinate.
        y: f64,
    },

    /// Score report. Fire-and-forget notification, not state.
    #[serde(rename = "targetHit")]
    TargetHit {
        /// Score claimed by the sender.
        score: i64,
    },

    /// Chat message.
    #[serde(rename = "message")]
    Chat {
        /// Message text.
        message: String,
    },
}

impl ClientMessage {
    /// The wire type string of this frame.
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::TargetHit { .. } => "targetHit",
            Self::Chat { .. } => "message",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ServerMessage — outbound frames
// ─────────────────────────────────────────────────────────────────────────────

/// A frame sent to one or more connected clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Full registry snapshot. Sent to a newly admitted client only, and
    /// always contains the new client's own freshly spawned entry.
    #[serde(rename = "init")]
    Init {
        /// Mapping of every open connection's id to its last-known position.
        users: HashMap<ClientId, Position>,
    },

    /// A new client joined. Sent to every client except the new one.
    #[serde(rename = "newUser")]
    NewUser {
        /// The new client's id.
        id: ClientId,
        /// The new client's spawn position.
        position: Position,
    },

    /// A client moved. Sent to all clients, the mover included.
    #[serde(rename = "move")]
    Move {
        /// The moving client's id.
        id: ClientId,
        /// The position just stored for that client.
        position: Position,
    },

    /// A client reported a hit. Sent to all clients, the sender included.
    #[serde(rename = "targetHit")]
    TargetHit {
        /// The reporting client's id.
        id: ClientId,
        /// The reported score.
        score: i64,
    },

    /// Chat relay. Sent to all clients, the sender included.
    #[serde(rename = "message")]
    Chat {
        /// The sending client's id.
        id: ClientId,
        /// Message text.
        message: String,
    },

    /// A client left. Sent to every remaining client.
    #[serde(rename = "removeUser")]
    RemoveUser {
        /// The departed client's id.
        id: ClientId,
    },
}

impl ServerMessage {
    /// The wire type string of this frame (for logging and metrics labels).
    #[must_use]
    pub fn message_type(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::NewUser { .. } => "newUser",
            Self::Move { .. } => "move",
            Self::TargetHit { .. } => "targetHit",
            Self::Chat { .. } => "message",
            Self::RemoveUser { .. } => "removeUser",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -- ClientMessage --

    #[test]
    fn client_move_serde() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "move", "x": 10.0, "y": 20.0})).unwrap();
        assert_eq!(msg, ClientMessage::Move { x: 10.0, y: 20.0 });
        assert_eq!(msg.message_type(), "move");
    }

    #[test]
    fn client_target_hit_serde() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "targetHit", "score": 5})).unwrap();
        assert_eq!(msg, ClientMessage::TargetHit { score: 5 });
        assert_eq!(msg.message_type(), "targetHit");
    }

    #[test]
    fn client_chat_serde() {
        let msg: ClientMessage =
            serde_json::from_value(json!({"type": "message", "message": "hi"})).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Chat {
                message: "hi".into()
            }
        );
        assert_eq!(msg.message_type(), "message");
    }

    #[test]
    fn client_rejects_unknown_type() {
        let result: Result<ClientMessage, _> =
            serde_json::from_value(json!({"type": "teleport", "x": 1.0}));
        assert!(result.is_err());
    }

    #[test]
    fn client_rejects_missing_fields() {
        let result: Result<ClientMessage, _> = serde_json::from_value(json!({"type": "move"}));
        assert!(result.is_err());
    }

    #[test]
    fn client_rejects_mistyped_payload() {
        let result: Result<ClientMessage, _> =
            serde_json::from_value(json!({"type": "move", "x": "left", "y": 2.0}));
        assert!(result.is_err());
    }

    // -- ServerMessage --

    #[test]
    fn server_init_wire_shape() {
        let mut users = HashMap::new();
        let _ = users.insert(ClientId::from("c1"), Position::new(1.0, 2.0));
        let msg = ServerMessage::Init { users };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "init");
        assert_eq!(value["users"]["c1"], json!({"x": 1.0, "y": 2.0}));
    }

    #[test]
    fn server_new_user_wire_shape() {
        let msg = ServerMessage::NewUser {
            id: ClientId::from("c1"),
            position: Position::new(3.0, 4.0),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"type": "newUser", "id": "c1", "position": {"x": 3.0, "y": 4.0}}));
    }

    #[test]
    fn server_move_wire_shape() {
        let msg = ServerMessage::Move {
            id: ClientId::from("c1"),
            position: Position::new(10.0, 20.0),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "move");
        assert_eq!(value["id"], "c1");
        assert_eq!(value["position"], json!({"x": 10.0, "y": 20.0}));
    }

    #[test]
    fn server_target_hit_wire_shape() {
        let msg = ServerMessage::TargetHit {
            id: ClientId::from("c1"),
            score: 42,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"type": "targetHit", "id": "c1", "score": 42}));
    }

    #[test]
    fn server_chat_wire_shape() {
        let msg = ServerMessage::Chat {
            id: ClientId::from("c1"),
            message: "hello".into(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"type": "message", "id": "c1", "message": "hello"}));
    }

    #[test]
    fn server_remove_user_wire_shape() {
        let msg = ServerMessage::RemoveUser {
            id: ClientId::from("c1"),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"type": "removeUser", "id": "c1"}));
    }

    #[test]
    fn server_message_types_are_distinct() {
        let messages = [
            ServerMessage::Init {
                users: HashMap::new(),
            },
            ServerMessage::NewUser {
                id: ClientId::from("c"),
                position: Position::new(0.0, 0.0),
            },
            ServerMessage::Move {
                id: ClientId::from("c"),
                position: Position::new(0.0, 0.0),
            },
            ServerMessage::TargetHit {
                id: ClientId::from("c"),
                score: 0,
            },
            ServerMessage::Chat {
                id: ClientId::from("c"),
                message: String::new(),
            },
            ServerMessage::RemoveUser {
                id: ClientId::from("c"),
            },
        ];
        let mut types: Vec<&str> = messages.iter().map(ServerMessage::message_type).collect();
        types.sort_unstable();
        types.dedup();
        assert_eq!(types.len(), messages.len());
    }

    #[test]
    fn server_message_round_trips() {
        let msg = ServerMessage::Move {
            id: ClientId::from("c9"),
            position: Position::new(-5.0, 1e6),
        };
        let text = serde_json::to_string(&msg).unwrap();
        let back: ServerMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(back, msg);
    }
}
