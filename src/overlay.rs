//! Overlay view-state machine.
//!
//! DESIGN
//! ======
//! The widget holds the latest chat message, a visibility flag, and at most
//! one hide deadline. Every accepted message replaces the deadline outright,
//! so an older message can never hide a newer one early: there is only ever
//! one timer and it always belongs to the latest message.
//!
//! This type is pure. Time comes in as an argument and nothing here sleeps;
//! the async driver in `widget` owns the actual timer.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::message::ChatMessage;

/// Lifecycle position of the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// No message has ever been shown.
    Idle,
    /// A message is on screen and the hide deadline is armed.
    Showing,
    /// The last message faded out. It is still retained as `latest`.
    Hidden,
}

/// Snapshot pushed to the visual surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayView {
    pub text: String,
    pub visible: bool,
    pub phase: Phase,
}

#[derive(Debug)]
pub struct OverlayWidget {
    latest: Option<ChatMessage>,
    phase: Phase,
    display_duration: Duration,
    hide_at: Option<Instant>,
}

impl OverlayWidget {
    #[must_use]
    pub fn new(display_duration: Duration) -> Self {
        Self { latest: None, phase: Phase::Idle, display_duration, hide_at: None }
    }

    /// Accept a new message at `now` and return the new hide deadline.
    ///
    /// Any previously armed deadline is discarded.
    pub fn receive(&mut self, message: ChatMessage, now: Instant) -> Instant {
        let hide_at = now + self.display_duration;
        self.latest = Some(message);
        self.phase = Phase::Showing;
        self.hide_at = Some(hide_at);
        hide_at
    }

    /// Hide the overlay if the armed deadline has passed.
    ///
    /// Returns `true` when the view changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.hide_at {
            Some(deadline) if now >= deadline => {
                self.hide_at = None;
                self.phase = Phase::Hidden;
                true
            }
            _ => false,
        }
    }

    /// Pending hide deadline, if a message is showing.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.phase == Phase::Showing
    }

    #[must_use]
    pub fn latest(&self) -> Option<&ChatMessage> {
        self.latest.as_ref()
    }

    /// Render the current state. Absent fields render as empty strings.
    #[must_use]
    pub fn view(&self) -> OverlayView {
        let text = self
            .latest
            .as_ref()
            .map_or_else(|| String::from(": "), ChatMessage::display_text);
        OverlayView { text, visible: self.is_visible(), phase: self.phase }
    }
}

#[cfg(test)]
#[path = "overlay_test.rs"]
mod tests;
