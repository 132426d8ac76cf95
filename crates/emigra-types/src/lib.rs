//! Shared types for the Emigra voice subsystem.
//!
//! This crate provides the domain types used across the voice workspace:
//! the session lifecycle status, the provider message log entries, the
//! caller's relocation profile, and the personalization-variable builder.
//!
//! No crate in the workspace depends on anything *except* `emigra-types` for
//! cross-cutting type definitions. This keeps the dependency graph clean and
//! prevents circular dependencies.

use serde::{Deserialize, Serialize};

mod message;
mod profile;

pub use message::{MessageKind, SessionMessage};
pub use profile::{personalization_variables, CallerProfile};

/// Lifecycle status of a conversational session.
///
/// `Error` is not terminal: a later connect attempt retries from `Error` or
/// `Idle` back into `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No session exists.
    Idle,
    /// A connection attempt is in flight.
    Connecting,
    /// The provider acknowledged the session.
    Connected,
    /// The last attempt failed; a human-readable reason is kept alongside.
    Error,
}

impl SessionStatus {
    /// Returns the canonical string label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown session status string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown session status: {0}")]
pub struct ParseSessionStatusError(pub String);

impl std::str::FromStr for SessionStatus {
    type Err = ParseSessionStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(Self::Idle),
            "connecting" => Ok(Self::Connecting),
            "connected" => Ok(Self::Connected),
            "error" => Ok(Self::Error),
            _ => Err(ParseSessionStatusError(s.to_string())),
        }
    }
}
