//! Per-client connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use beacon_core::ClientId;
use tokio::sync::mpsc;

/// Capacity of a client's outbound frame queue.
///
/// Sized for bursts of presence traffic; a client that stays full is falling
/// behind the broadcast rate and becomes an eviction candidate.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Handle to one connected client's outbound queue.
///
/// The hub holds one of these per ACTIVE connection and pushes
/// pre-serialized frames into it without blocking. The write half of the
/// WebSocket drains the paired receiver. Frames are `Arc<String>` so a
/// broadcast serializes once and shares the buffer across all recipients.
#[derive(Debug)]
pub struct ClientConnection {
    /// Connection identity, assigned at admission.
    pub id: ClientId,
    sender: mpsc::Sender<Arc<String>>,
    drops: AtomicU64,
}

impl ClientConnection {
    /// Create a handle over the sending half of a client's outbound queue.
    #[must_use]
    pub fn new(id: ClientId, sender: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            sender,
            drops: AtomicU64::new(0),
        }
    }

    /// Queue a frame for delivery without blocking.
    ///
    /// Returns `false` when the queue is full or the receiver is gone; the
    /// frame is dropped for this client only and the lifetime drop counter
    /// is incremented.
    pub fn send(&self, frame: Arc<String>) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(_) => {
                let _ = self.drops.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Total frames dropped for this client over its lifetime.
    #[must_use]
    pub fn drop_count(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    /// Whether the receiving half has been dropped (writer task gone).
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
