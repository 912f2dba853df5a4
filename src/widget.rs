//! Mounted overlay: the async driver around `OverlayWidget`.
//!
//! DESIGN
//! ======
//! `mount` spawns one task that owns the widget, the source link, and a
//! single pinned hide timer. The task `select!`s over inbound frames, the
//! timer, and the unmount signal, so state changes happen strictly one at a
//! time in delivery order. Each accepted message resets the one timer
//! (cancel-before-arm). View snapshots are published on a `watch` channel;
//! the surface only ever reads them.
//!
//! LIFECYCLE
//! =========
//! 1. `mount` → link connecting, view `idle`
//! 2. Frame → parse → `receive` → publish `showing` → timer reset
//! 3. Timer → `expire` → publish `hidden`
//! 4. `unmount` (or handle dropped) → loop exits → link closed → view
//!    sender dropped, so no update can follow

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::config::OverlayConfig;
use crate::message::parse_chat_message;
use crate::overlay::{OverlayView, OverlayWidget};
use crate::source::{self, ConnectionStatus, SourceHandle};

pub struct MountedOverlay {
    view: watch::Receiver<OverlayView>,
    status: watch::Receiver<ConnectionStatus>,
    unmount: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MountedOverlay {
    /// Subscribe to view snapshots.
    #[must_use]
    pub fn view(&self) -> watch::Receiver<OverlayView> {
        self.view.clone()
    }

    /// Subscribe to source link state.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Stop the widget, close the source link, and wait for both.
    pub async fn unmount(mut self) {
        if let Some(tx) = self.unmount.take() {
            if tx.send(()).is_err() {
                debug!("overlay: driver already stopped");
            }
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "overlay: driver task failed");
            }
        }
    }
}

/// Mount the overlay against the configured chat source.
#[must_use]
pub fn mount(config: &OverlayConfig) -> MountedOverlay {
    let source = source::spawn(config.connection_url.clone(), config.reconnect);
    mount_with_source(OverlayWidget::new(config.display_duration), source)
}

/// Mount `widget` on an already started source.
#[must_use]
pub fn mount_with_source(widget: OverlayWidget, source: SourceHandle) -> MountedOverlay {
    let (view_tx, view) = watch::channel(widget.view());
    let status = source.link.status();
    let (unmount_tx, unmount_rx) = oneshot::channel();

    let task = tokio::spawn(drive(widget, source, view_tx, unmount_rx));

    MountedOverlay { view, status, unmount: Some(unmount_tx), task: Some(task) }
}

async fn drive(
    mut widget: OverlayWidget,
    source: SourceHandle,
    view_tx: watch::Sender<OverlayView>,
    mut unmount: oneshot::Receiver<()>,
) {
    let SourceHandle { mut frames, link } = source;

    // Only polled while a deadline is armed.
    let hide = sleep_until(Instant::now());
    tokio::pin!(hide);

    loop {
        tokio::select! {
            _ = &mut unmount => break,
            frame = frames.recv() => {
                let Some(text) = frame else {
                    debug!("overlay: source stopped delivering frames");
                    break;
                };
                handle_frame(&mut widget, &text, hide.as_mut(), &view_tx);
            }
            () = &mut hide, if widget.deadline().is_some() => {
                if widget.expire(Instant::now()) {
                    if let Some(msg) = widget.latest() {
                        debug!(login = %msg.login, "overlay: hidden");
                    }
                    view_tx.send_replace(widget.view());
                }
            }
        }
    }

    drop(frames);
    link.close().await;
    info!("overlay: unmounted");
}

fn handle_frame(
    widget: &mut OverlayWidget,
    text: &str,
    hide: std::pin::Pin<&mut tokio::time::Sleep>,
    view_tx: &watch::Sender<OverlayView>,
) {
    let msg = match parse_chat_message(text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!(error = %e, len = text.len(), "overlay: dropped malformed frame");
            return;
        }
    };

    info!(user_id = %msg.user_id, %msg, "overlay: message received");
    let deadline = widget.receive(msg, Instant::now());
    hide.reset(deadline);
    view_tx.send_replace(widget.view());
}

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;
