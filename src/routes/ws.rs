//! WebSocket handler — relay between a browser tab and its session task.
//!
//! DESIGN
//! ======
//! On upgrade, generates a session ID, spawns a session, and splits the
//! socket in two:
//! - a writer task drains frames produced by the session into the socket
//! - the handler reads text frames, parses them, and queues session commands
//!
//! The writer never waits on the reader, so a client flooding commands
//! cannot stall the frames the session is trying to deliver.
//!
//! The handler owns transport concerns only. All draw and login logic lives
//! in `services::session`.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `connected` with `session_id`
//! 2. Session sends its initial `view`
//! 3. Client commands flow in, session frames flow out
//! 4. Close → command channel dropped → session finishes any pending draw

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::frame::{ClientFrame, ServerFrame};
use crate::notify::{Notifier, Toast};
use crate::services::session::spawn_session;
use crate::state::AppState;

const OUTBOUND_CAPACITY: usize = 256;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    if send_frame(&mut sink, &ServerFrame::Connected { session_id }).await.is_err() {
        return;
    }

    let (out_tx, mut out_rx) = mpsc::channel::<ServerFrame>(OUTBOUND_CAPACITY);
    let commands = spawn_session(session_id, state.store.clone(), state.wheel, out_tx.clone());
    info!(%session_id, "ws: client connected");

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if send_frame(&mut sink, &frame).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            msg = stream.next() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => match ClientFrame::parse(text.as_str()) {
                        Ok(frame) => {
                            debug!(%session_id, kind = frame.kind(), "ws: recv frame");
                            if commands.send(frame.into()).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(%session_id, error = %e, "ws: invalid inbound frame");
                            out_tx.notify(Toast::error("Invalid message"));
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            _ = &mut writer => {
                debug!(%session_id, "ws: writer closed");
                break;
            }
        }
    }

    // Frames still queued have nowhere to go once the reader is done.
    writer.abort();
    info!(%session_id, "ws: client disconnected");
}

async fn send_frame(sink: &mut SplitSink<WebSocket, Message>, frame: &ServerFrame) -> Result<(), axum::Error> {
    match frame.to_json() {
        Ok(json) => sink.send(Message::Text(json.into())).await,
        Err(e) => {
            error!(error = %e, "ws: failed to encode frame");
            Ok(())
        }
    }
}
