//! View stream: pushes overlay snapshots to the rendered page.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send the current snapshot
//! 2. Each view change → send the new snapshot
//! 3. Viewer closes, or the overlay unmounts → end
//!
//! The stream is one-way. Anything the page sends is ignored.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::overlay::OverlayView;
use crate::state::AppState;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state.view))
}

async fn run_ws(mut socket: WebSocket, mut view: watch::Receiver<OverlayView>) {
    debug!("ws: viewer connected");

    let initial = view.borrow_and_update().clone();
    if let Err(e) = send_view(&mut socket, &initial).await {
        warn!(error = %e, "ws: initial view not delivered");
        return;
    }

    loop {
        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    debug!("ws: overlay unmounted, ending stream");
                    break;
                }
                let snapshot = view.borrow_and_update().clone();
                if let Err(e) = send_view(&mut socket, &snapshot).await {
                    warn!(error = %e, "ws: view not delivered, ending stream");
                    break;
                }
            }
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    if let Err(e) = socket.send(Message::Close(None)).await {
        debug!(error = %e, "ws: close after stream end failed");
    }
    debug!("ws: viewer disconnected");
}

#[derive(Debug, thiserror::Error)]
enum StreamError {
    #[error("view encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("socket send failed: {0}")]
    Socket(#[from] axum::Error),
}

fn encode_view(view: &OverlayView) -> Result<Message, StreamError> {
    Ok(Message::Text(serde_json::to_string(view)?.into()))
}

async fn send_view(socket: &mut WebSocket, view: &OverlayView) -> Result<(), StreamError> {
    socket.send(encode_view(view)?).await?;
    Ok(())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
