//! One-time personalization handshake.

use std::collections::BTreeMap;

use emigra_types::{personalization_variables, CallerProfile, MessageKind, SessionMessage};

/// Delivers the caller's personalization variables to the remote session
/// exactly once, after the provider signals readiness.
///
/// Variables transmitted before the ready signal risk silent rejection by
/// the provider, so [`due`](Self::due) scans the full message log for a
/// `session-ready` entry on every delivery. The `sent` flag holds the
/// at-most-once invariant per session and is re-armed by
/// [`reset`](Self::reset) when a new session begins.
#[derive(Debug)]
pub struct PersonalizationHandshake {
    profile: Option<CallerProfile>,
    authenticated: bool,
    sent: bool,
}

impl PersonalizationHandshake {
    pub fn new(profile: Option<CallerProfile>, authenticated: bool) -> Self {
        Self {
            profile,
            authenticated,
            sent: false,
        }
    }

    /// Re-arms the handshake for a fresh session.
    pub fn reset(&mut self) {
        self.sent = false;
    }

    pub fn sent(&self) -> bool {
        self.sent
    }

    /// Returns the variables to transmit if the session has signaled
    /// readiness and nothing has been sent yet.
    ///
    /// Scans the whole log, not just new entries: readiness may have
    /// arrived in any earlier delivery. Returning `None` means "not yet",
    /// never an error.
    pub fn due(&self, log: &[SessionMessage]) -> Option<BTreeMap<String, String>> {
        if self.sent {
            return None;
        }
        if !log.iter().any(|m| m.kind == MessageKind::SessionReady) {
            return None;
        }
        Some(personalization_variables(
            self.profile.as_ref(),
            self.authenticated,
        ))
    }

    /// Consumes the one-shot transmission for this session.
    pub fn mark_sent(&mut self) {
        self.sent = true;
        tracing::debug!("personalization handshake completed");
    }
}
