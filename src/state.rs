//! Shared surface state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! only holds read sides: the overlay view, the source link status, and the
//! anchor used when rendering the page. Handlers never mutate the overlay.

use tokio::sync::watch;

use crate::config::Anchor;
use crate::overlay::OverlayView;
use crate::source::ConnectionStatus;
use crate::widget::MountedOverlay;

/// Clone is required by Axum; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub view: watch::Receiver<OverlayView>,
    pub status: watch::Receiver<ConnectionStatus>,
    pub anchor: Anchor,
}

impl AppState {
    #[must_use]
    pub fn new(overlay: &MountedOverlay, anchor: Anchor) -> Self {
        Self { view: overlay.view(), status: overlay.status(), anchor }
    }
}
