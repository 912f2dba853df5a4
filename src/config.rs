//! Overlay configuration parsed from environment variables.
//!
//! All variables are optional. Values that are present but malformed are
//! rejected instead of falling back to the default, so a typo in a broadcast
//! setup fails loudly at startup.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONNECTION_URL: &str = "ws://localhost:8081/";
pub const DEFAULT_DISPLAY_DURATION_MS: u64 = 5000;
pub const DEFAULT_RECONNECT_INITIAL_MS: u64 = 1000;
pub const DEFAULT_RECONNECT_MAX_MS: u64 = 10_000;
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a ws:// or wss:// url, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} must be greater than zero")]
    Zero { var: &'static str },
    #[error("unknown OVERLAY_ANCHOR '{0}' (expected top-left, top-right, bottom-left or bottom-right)")]
    UnknownAnchor(String),
    #[error("OVERLAY_BIND must be a socket address, got '{0}'")]
    InvalidBind(String),
    #[error("OVERLAY_RECONNECT_MAX_MS ({max}) is below OVERLAY_RECONNECT_INITIAL_MS ({initial})")]
    BackoffRange { initial: u64, max: u64 },
}

/// Screen corner the overlay box is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

impl Anchor {
    /// Whether the box sits against the bottom edge. Decides which way it
    /// slides while fading out.
    #[must_use]
    pub fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl FromStr for Anchor {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            _ => Err(ConfigError::UnknownAnchor(raw.to_string())),
        }
    }
}

/// Exponential backoff bounds for the source link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(DEFAULT_RECONNECT_INITIAL_MS),
            max: Duration::from_millis(DEFAULT_RECONNECT_MAX_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    pub connection_url: String,
    pub display_duration: Duration,
    pub anchor: Anchor,
    pub reconnect: ReconnectPolicy,
    pub bind: SocketAddr,
}

impl OverlayConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `OVERLAY_CONNECTION_URL`: default `ws://localhost:8081/`
    /// - `OVERLAY_DISPLAY_DURATION_MS`: default 5000
    /// - `OVERLAY_ANCHOR`: default `bottom-left`
    /// - `OVERLAY_RECONNECT_INITIAL_MS`: default 1000
    /// - `OVERLAY_RECONNECT_MAX_MS`: default 10000
    /// - `OVERLAY_BIND`: default `127.0.0.1:3000`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for any variable that is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Same as [`OverlayConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for any value that is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connection_url = parse_url(lookup("OVERLAY_CONNECTION_URL").as_deref())?;
        let display_duration = Duration::from_millis(parse_millis(
            "OVERLAY_DISPLAY_DURATION_MS",
            lookup("OVERLAY_DISPLAY_DURATION_MS").as_deref(),
            DEFAULT_DISPLAY_DURATION_MS,
        )?);
        let anchor = match lookup("OVERLAY_ANCHOR") {
            Some(raw) => raw.parse()?,
            None => Anchor::default(),
        };

        let initial = parse_millis(
            "OVERLAY_RECONNECT_INITIAL_MS",
            lookup("OVERLAY_RECONNECT_INITIAL_MS").as_deref(),
            DEFAULT_RECONNECT_INITIAL_MS,
        )?;
        let max = parse_millis(
            "OVERLAY_RECONNECT_MAX_MS",
            lookup("OVERLAY_RECONNECT_MAX_MS").as_deref(),
            DEFAULT_RECONNECT_MAX_MS,
        )?;
        if max < initial {
            return Err(ConfigError::BackoffRange { initial, max });
        }
        let reconnect =
            ReconnectPolicy { initial: Duration::from_millis(initial), max: Duration::from_millis(max) };

        let bind_raw = lookup("OVERLAY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBind(bind_raw.clone()))?;

        Ok(Self { connection_url, display_duration, anchor, reconnect, bind })
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            connection_url: DEFAULT_CONNECTION_URL.to_string(),
            display_duration: Duration::from_millis(DEFAULT_DISPLAY_DURATION_MS),
            anchor: Anchor::default(),
            reconnect: ReconnectPolicy::default(),
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }
}

fn parse_url(raw: Option<&str>) -> Result<String, ConfigError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_CONNECTION_URL.to_string());
    };
    let url = raw.trim();
    let has_host = url
        .strip_prefix("ws://")
        .or_else(|| url.strip_prefix("wss://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidUrl { var: "OVERLAY_CONNECTION_URL", value: raw.to_string() });
    }
    Ok(url.to_string())
}

fn parse_millis(var: &'static str, raw: Option<&str>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidNumber { var, value: raw.to_string() })?;
    if value == 0 {
        return Err(ConfigError::Zero { var });
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
