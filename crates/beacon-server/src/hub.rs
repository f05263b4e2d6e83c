//! Session hub: connection lifecycle, message dispatch, and fan-out.
//!
//! The hub owns the registry and the connection set behind one mutex, and
//! every lifecycle transition (connect, disconnect) and inbound frame is
//! processed as a single mutate-then-enumerate step under that lock. Nothing
//! awaits while the lock is held — delivery uses non-blocking per-client
//! queues — so a slow client can never stall the others.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use beacon_core::{ClientId, ClientMessage, Position, RegistryError, ServerMessage};
use metrics::{counter, gauge};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::connection::ClientConnection;
use crate::metrics::{
    CLIENTS_ACTIVE, WS_BROADCAST_DROPS_TOTAL, WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL,
    WS_SLOW_EVICTIONS_TOTAL,
};
use crate::registry::Registry;

/// Maximum lifetime frame drops before a client is forcibly disconnected.
pub const MAX_TOTAL_DROPS: u64 = 100;

/// Registry and connection set, guarded together.
///
/// Held behind one lock so no broadcast can ever enumerate a connection
/// whose registry entry is gone, or reference a registry entry whose
/// connection has closed.
#[derive(Default)]
struct HubState {
    registry: Registry,
    connections: HashMap<ClientId, Arc<ClientConnection>>,
}

/// Connection lifecycle and broadcast hub.
pub struct SessionHub {
    state: Mutex<HubState>,
    /// Atomic counter mirroring the connection map size (avoids locking for
    /// count queries from health checks).
    active_count: AtomicUsize,
}

impl SessionHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HubState::default()),
            active_count: AtomicUsize::new(0),
        }
    }

    /// Admit a connection: register it at a random spawn position, send it
    /// the full registry snapshot (its own entry included), then announce it
    /// to everyone else.
    ///
    /// Returns the spawn position, or refuses the connection when its id is
    /// somehow already registered.
    pub async fn connect(&self, conn: Arc<ClientConnection>) -> Result<Position, RegistryError> {
        let spawn = Position::random_spawn();
        let mut state = self.state.lock().await;

        state.registry.insert(conn.id.clone(), spawn)?;
        let _ = state.connections.insert(conn.id.clone(), Arc::clone(&conn));
        let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        counter!(WS_CONNECTIONS_TOTAL).increment(1);
        gauge!(CLIENTS_ACTIVE).set(state.connections.len() as f64);

        // Snapshot after the insert so the init message contains the new
        // client's own entry.
        let init = ServerMessage::Init {
            users: state.registry.snapshot(),
        };
        Self::send_direct(&conn, &init);

        let notice = ServerMessage::NewUser {
            id: conn.id.clone(),
            position: spawn,
        };
        let slow = Self::fan_out(&state, &notice, Some(&conn.id));
        self.evict(&mut state, slow);

        info!(client_id = %conn.id, x = spawn.x, y = spawn.y, "client connected");
        Ok(spawn)
    }

    /// Remove a connection and announce its departure to everyone left.
    ///
    /// Idempotent: a second call for the same id (disconnect racing
    /// transport teardown, or after a slow-client eviction) is a no-op.
    pub async fn disconnect(&self, id: &ClientId) {
        let mut state = self.state.lock().await;

        let had_connection = state.connections.remove(id).is_some();
        let had_entry = state.registry.remove(id).is_some();
        if !had_connection && !had_entry {
            debug!(client_id = %id, "disconnect for already-closed connection");
            return;
        }

        if had_connection {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
            counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
            gauge!(CLIENTS_ACTIVE).set(state.connections.len() as f64);
        }

        let notice = ServerMessage::RemoveUser { id: id.clone() };
        let slow = Self::fan_out(&state, &notice, None);
        self.evict(&mut state, slow);

        info!(client_id = %id, "client disconnected");
    }

    /// Dispatch one inbound frame from a connected client.
    ///
    /// Frames from a connection that has already closed are ignored.
    pub async fn handle_message(&self, id: &ClientId, message: ClientMessage) {
        let mut state = self.state.lock().await;

        if !state.registry.contains(id) {
            debug!(
                client_id = %id,
                frame = message.message_type(),
                "frame for closed connection ignored"
            );
            return;
        }

        let outbound = match message {
            ClientMessage::Move { x, y } => {
                let position = Position::new(x, y);
                if !state.registry.update(id, position) {
                    // Unreachable given the membership check above; kept as a
                    // logged no-op so a future refactor cannot make it fatal.
                    warn!(client_id = %id, "move for unregistered client dropped");
                    return;
                }
                ServerMessage::Move {
                    id: id.clone(),
                    position,
                }
            }
            ClientMessage::TargetHit { score } => ServerMessage::TargetHit {
                id: id.clone(),
                score,
            },
            ClientMessage::Chat { message } => ServerMessage::Chat {
                id: id.clone(),
                message,
            },
        };

        let slow = Self::fan_out(&state, &outbound, None);
        self.evict(&mut state, slow);
    }

    /// Number of ACTIVE connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }

    /// Registry snapshot, for health reporting and tests.
    pub async fn registry_snapshot(&self) -> HashMap<ClientId, Position> {
        self.state.lock().await.registry.snapshot()
    }

    /// Whether `id` currently has an open connection and a registry entry.
    pub async fn is_active(&self, id: &ClientId) -> bool {
        let state = self.state.lock().await;
        state.registry.contains(id) && state.connections.contains_key(id)
    }

    /// Serialize once and deliver to every connection except `exclude`.
    ///
    /// Per-recipient failures are isolated: a full or closed queue drops the
    /// frame for that client only. Returns the clients whose lifetime drop
    /// count has crossed the eviction threshold.
    fn fan_out(
        state: &HubState,
        message: &ServerMessage,
        exclude: Option<&ClientId>,
    ) -> Vec<ClientId> {
        let Some(frame) = Self::encode(message) else {
            return Vec::new();
        };

        let mut slow = Vec::new();
        let mut recipients = 0u32;
        for (id, conn) in &state.connections {
            if exclude == Some(id) {
                continue;
            }
            recipients += 1;
            if !conn.send(Arc::clone(&frame)) {
                counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                let drops = conn.drop_count();
                if drops >= MAX_TOTAL_DROPS {
                    slow.push(id.clone());
                } else {
                    warn!(
                        client_id = %id,
                        frame = message.message_type(),
                        total_drops = drops,
                        "failed to deliver frame (queue full)"
                    );
                }
            }
        }
        debug!(
            frame = message.message_type(),
            recipients, "broadcast delivered"
        );
        slow
    }

    /// Forcibly disconnect clients that can no longer keep up.
    ///
    /// Runs inside the same critical section as the triggering broadcast, so
    /// no later fan-out can reference an evicted client. Single pass: a
    /// client that newly crosses the threshold during the departure notices
    /// is picked up by the next event.
    fn evict(&self, state: &mut HubState, slow: Vec<ClientId>) {
        for id in slow {
            if state.connections.remove(&id).is_none() {
                continue;
            }
            let _ = state.registry.remove(&id);
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
            counter!(WS_SLOW_EVICTIONS_TOTAL).increment(1);
            counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
            gauge!(CLIENTS_ACTIVE).set(state.connections.len() as f64);
            warn!(client_id = %id, "forcibly disconnected slow client");

            let notice = ServerMessage::RemoveUser { id };
            let _ = Self::fan_out(state, &notice, None);
        }
    }

    /// Send one frame to a single connection (init path).
    fn send_direct(conn: &ClientConnection, message: &ServerMessage) {
        if let Some(frame) = Self::encode(message) {
            if !conn.send(frame) {
                counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                warn!(
                    client_id = %conn.id,
                    frame = message.message_type(),
                    "failed to deliver frame (queue full)"
                );
            }
        }
    }

    fn encode(message: &ServerMessage) -> Option<Arc<String>> {
        match serde_json::to_string(message) {
            Ok(json) => Some(Arc::new(json)),
            Err(e) => {
                warn!(frame = message.message_type(), error = %e, "failed to serialize frame");
                None
            }
        }
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
