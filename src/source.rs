//! Supervised websocket link to the chat source.
//!
//! DESIGN
//! ======
//! One background task owns the socket. It connects, forwards every text
//! frame into a bounded channel, and reconnects with exponential backoff
//! whenever the link fails or the source hangs up. Connection state is
//! published on a `watch` channel for diagnostics; the overlay itself never
//! reacts to it, messages simply resume when the link recovers.
//!
//! LIFECYCLE
//! =========
//! 1. `spawn` → `Connecting`
//! 2. Handshake ok → `Connected`, backoff reset
//! 3. Close / error → `Disconnected` → sleep backoff (+ jitter) → 1
//! 4. `SourceLink::close` or dropped frame receiver → close frame → `Closed`

use std::time::Duration;

use futures_util::StreamExt;
use rand::Rng;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::config::ReconnectPolicy;

/// Frames buffered between the socket task and the overlay driver.
const FRAME_BUFFER: usize = 64;

/// Upper bound of the random extra delay, as a fraction of the base delay.
const JITTER_RATIO: f64 = 0.2;

type SourceStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Link state as observed by the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Closed,
}

impl ReconnectPolicy {
    /// Delay to use after `current` failed.
    #[must_use]
    pub fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max)
    }
}

/// Add up to `JITTER_RATIO` of random delay so restarted overlays do not
/// hammer the source in lockstep.
fn jittered(delay: Duration) -> Duration {
    let extra = rand::rng().random_range(0.0..=JITTER_RATIO);
    delay + delay.mul_f64(extra)
}

/// Receiving half handed to the overlay driver.
pub struct SourceHandle {
    pub frames: mpsc::Receiver<String>,
    pub link: SourceLink,
}

/// Control half of the link: status observation and shutdown.
pub struct SourceLink {
    status: watch::Receiver<ConnectionStatus>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SourceLink {
    #[must_use]
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Close the socket and wait for the supervisor to exit.
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The supervisor may already be gone; nothing to signal then.
            if tx.send(()).is_err() {
                debug!("source: supervisor already stopped");
            }
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "source: supervisor task failed");
            }
        }
    }
}

impl Drop for SourceLink {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

/// Start the supervisor for `url`.
#[must_use]
pub fn spawn(url: String, policy: ReconnectPolicy) -> SourceHandle {
    let (frames_tx, frames) = mpsc::channel(FRAME_BUFFER);
    let (status_tx, status) = watch::channel(ConnectionStatus::Connecting);
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(supervise(url, policy, frames_tx, status_tx, shutdown_rx));

    let link = SourceLink { status, shutdown: Some(shutdown_tx), task: Some(task) };
    SourceHandle { frames, link }
}

/// A link with no socket behind it, fed by whoever holds the returned sender.
#[cfg(test)]
pub fn detached() -> (mpsc::Sender<String>, SourceHandle) {
    let (frames_tx, frames) = mpsc::channel(FRAME_BUFFER);
    let (_status_tx, status) = watch::channel(ConnectionStatus::Closed);
    let link = SourceLink { status, shutdown: None, task: None };
    (frames_tx, SourceHandle { frames, link })
}

/// Why a single connection ended.
enum LinkEnd {
    /// Shutdown requested, or nobody is reading frames any more.
    Stopped,
    /// The source went away; reconnect.
    Dropped(String),
}

async fn supervise(
    url: String,
    policy: ReconnectPolicy,
    frames_tx: mpsc::Sender<String>,
    status_tx: watch::Sender<ConnectionStatus>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut backoff = policy.initial;

    loop {
        status_tx.send_replace(ConnectionStatus::Connecting);

        let attempt = tokio::select! {
            _ = &mut shutdown => break,
            attempt = connect_async(url.as_str()) => attempt,
        };

        match attempt {
            Ok((stream, _response)) => {
                info!(%url, "source: connected");
                status_tx.send_replace(ConnectionStatus::Connected);
                backoff = policy.initial;

                match pump(stream, &frames_tx, &mut shutdown).await {
                    LinkEnd::Stopped => break,
                    LinkEnd::Dropped(reason) => warn!(%url, %reason, "source: connection lost"),
                }
            }
            Err(e) => warn!(%url, error = %e, "source: connect failed"),
        }

        status_tx.send_replace(ConnectionStatus::Disconnected);
        if frames_tx.is_closed() {
            break;
        }

        let delay = jittered(backoff);
        debug!(%url, delay_ms = delay.as_millis(), "source: reconnecting");
        tokio::select! {
            _ = &mut shutdown => break,
            () = tokio::time::sleep(delay) => {}
        }
        backoff = policy.next_delay(backoff);
    }

    status_tx.send_replace(ConnectionStatus::Closed);
    info!(%url, "source: closed");
}

/// Forward frames from one live connection until it ends.
async fn pump(
    mut stream: SourceStream,
    frames_tx: &mpsc::Sender<String>,
    shutdown: &mut oneshot::Receiver<()>,
) -> LinkEnd {
    loop {
        let next = tokio::select! {
            _ = &mut *shutdown => {
                close_stream(&mut stream).await;
                return LinkEnd::Stopped;
            }
            next = stream.next() => next,
        };

        let text = match next {
            Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
            Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    warn!(len = bytes.len(), "source: dropped non-utf8 binary frame");
                    continue;
                }
            },
            Some(Ok(Message::Close(frame))) => {
                let reason = frame.map_or_else(
                    || "closed by source".to_string(),
                    |f| format!("closed by source: {}", f.reason),
                );
                return LinkEnd::Dropped(reason);
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return LinkEnd::Dropped(e.to_string()),
            None => return LinkEnd::Dropped("stream ended".to_string()),
        };

        if frames_tx.send(text).await.is_err() {
            close_stream(&mut stream).await;
            return LinkEnd::Stopped;
        }
    }
}

async fn close_stream(stream: &mut SourceStream) {
    if let Err(e) = stream.close(None).await {
        debug!(error = %e, "source: close handshake failed");
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
