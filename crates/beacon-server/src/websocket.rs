//! Per-connection WebSocket actor.
//!
//! Each accepted socket is split into halves:
//!
//! - Writer task: owns the sink, drains the client's outbound frame queue
//!   and a control channel (pings, pongs, close frames).
//! - Reader loop: parses inbound text frames into protocol messages and
//!   dispatches them to the hub.
//!
//! A heartbeat task pings every [`PING_INTERVAL`]; a missing pong within
//! [`PONG_TIMEOUT`] closes the connection, so abruptly dropped clients
//! cannot leak registry entries.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use beacon_core::{ClientId, ClientMessage, ProtocolError};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use metrics::counter;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};
use tracing::{debug, info, warn};

use crate::connection::{ClientConnection, OUTBOUND_QUEUE_CAPACITY};
use crate::hub::SessionHub;
use crate::metrics::{WS_FRAMES_IN_TOTAL, WS_PROTOCOL_ERRORS_TOTAL};

/// Server ping cadence.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Grace period for a pong after each ping.
pub const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Drive one client connection from admission to teardown.
pub async fn run_connection(socket: WebSocket, hub: Arc<SessionHub>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (data_tx, data_rx) = mpsc::channel::<Arc<String>>(OUTBOUND_QUEUE_CAPACITY);
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();

    let client_id = ClientId::new();
    let conn = Arc::new(ClientConnection::new(client_id.clone(), data_tx));

    // Admission registers the client and queues its init snapshot, so the
    // writer must not start draining before connect succeeds.
    if let Err(e) = hub.connect(Arc::clone(&conn)).await {
        warn!(client_id = %client_id, error = %e, "refusing connection");
        return;
    }

    let writer_handle = tokio::spawn(writer_task(ws_sender, data_rx, control_rx));

    // Heartbeat: ping on a timer, require a pong within the grace period.
    let (pong_tx, mut pong_rx) = mpsc::unbounded_channel::<()>();
    let ping_control = control_tx.clone();
    let heartbeat_id = client_id.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ping_timer = interval(PING_INTERVAL);
        // Skip the first immediate tick.
        let _ = ping_timer.tick().await;

        loop {
            let _ = ping_timer.tick().await;

            if ping_control.send(Message::Ping(Vec::new().into())).is_err() {
                // Writer task has died — connection is gone.
                break;
            }

            match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
                Ok(Some(())) => {}
                _ => {
                    warn!(client_id = %heartbeat_id, "pong timeout, closing connection");
                    let _ = ping_control.send(Message::Close(Some(CloseFrame {
                        code: 1001,
                        reason: "pong timeout".into(),
                    })));
                    break;
                }
            }
        }
    });

    // Reader loop: one protocol frame per text message.
    while let Some(received) = ws_receiver.next().await {
        match received {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    counter!(WS_FRAMES_IN_TOTAL, "frame" => message.message_type()).increment(1);
                    hub.handle_message(&client_id, message).await;
                }
                Err(e) => {
                    let err = ProtocolError::from(e);
                    counter!(WS_PROTOCOL_ERRORS_TOTAL).increment(1);
                    warn!(client_id = %client_id, error = %err, "dropping malformed frame");
                }
            },
            Ok(Message::Binary(data)) => {
                let err = ProtocolError::BinaryFrame { len: data.len() };
                counter!(WS_PROTOCOL_ERRORS_TOTAL).increment(1);
                warn!(client_id = %client_id, error = %err, "dropping unsupported frame");
            }
            Ok(Message::Ping(data)) => {
                let _ = control_tx.send(Message::Pong(data));
            }
            Ok(Message::Pong(_)) => {
                let _ = pong_tx.send(());
            }
            Ok(Message::Close(frame)) => {
                debug!(client_id = %client_id, reason = ?frame, "client initiated close");
                break;
            }
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "websocket receive error");
                break;
            }
        }
    }

    writer_handle.abort();
    ping_handle.abort();

    hub.disconnect(&client_id).await;
    info!(client_id = %client_id, "websocket actor stopped");
}

/// Forward queued frames and control messages to the WebSocket sink.
async fn writer_task(
    mut sink: SplitSink<WebSocket, Message>,
    mut data_rx: mpsc::Receiver<Arc<String>>,
    mut control_rx: mpsc::UnboundedReceiver<Message>,
) {
    loop {
        let message = tokio::select! {
            frame = data_rx.recv() => match frame {
                Some(frame) => Message::Text(frame.as_str().into()),
                None => break,
            },
            control = control_rx.recv() => match control {
                Some(message) => message,
                None => break,
            },
        };

        let closing = matches!(message, Message::Close(_));
        if sink.send(message).await.is_err() || closing {
            break;
        }
    }
}
