//! Chat message wire type.
//!
//! DESIGN
//! ======
//! Frames arrive from the chat source as flat JSON objects with snake_case
//! keys. The overlay never constructs these locally; it only decodes them.
//! Unknown keys are ignored so the source can grow its payload without
//! breaking the overlay. `timestamp` is carried through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One chat line pushed by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier of the author.
    pub user_id: String,
    /// Display name of the author.
    pub login: String,
    /// Message text.
    pub message: String,
    /// Origination time as sent by the source. Opaque.
    pub timestamp: String,
}

impl ChatMessage {
    /// Text shown on the overlay: `"<login>: <message>"`.
    #[must_use]
    pub fn display_text(&self) -> String {
        format!("{}: {}", self.login, self.message)
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.login, self.message, self.timestamp)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("invalid chat payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Decode one inbound text frame.
///
/// # Errors
///
/// Returns `ParseError` if the frame is not JSON or any required field is
/// missing or not a string.
pub fn parse_chat_message(text: &str) -> Result<ChatMessage, ParseError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
