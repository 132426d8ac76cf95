//! Message log entries emitted by the conversational provider.
//!
//! The provider's wire format is loosely typed; anything this client does not
//! recognise lands in [`MessageKind::Other`] and is carried in the log
//! untouched rather than rejected.

use serde::{Deserialize, Serialize};

/// Kind tag of a provider message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The remote session finished its own setup and accepts settings.
    SessionReady,
    /// Transcribed speech from the caller.
    UserUtterance,
    /// Speech synthesised for the assistant.
    AssistantUtterance,
    /// Any shape this client does not understand.
    #[serde(other)]
    Other,
}

/// One entry in a session's append-only message log.
///
/// Messages are immutable once appended; the log grows monotonically for the
/// lifetime of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    /// Kind tag, parsed defensively.
    pub kind: MessageKind,
    /// Text content, when the kind carries any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl SessionMessage {
    /// A readiness signal from the remote session.
    pub fn session_ready() -> Self {
        Self {
            kind: MessageKind::SessionReady,
            text: None,
        }
    }

    /// A transcribed caller utterance.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::UserUtterance,
            text: Some(text.into()),
        }
    }

    /// An assistant utterance.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::AssistantUtterance,
            text: Some(text.into()),
        }
    }

    /// Returns the caller's spoken text, if this is a user utterance with
    /// non-empty content.
    pub fn spoken_text(&self) -> Option<&str> {
        match self.kind {
            MessageKind::UserUtterance => self.text.as_deref().filter(|t| !t.is_empty()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_parses_as_other() {
        let msg: SessionMessage =
            serde_json::from_str(r#"{"kind": "ping", "text": "ignored"}"#).expect("should parse");
        assert_eq!(msg.kind, MessageKind::Other);
        assert_eq!(msg.text.as_deref(), Some("ignored"));
    }

    #[test]
    fn known_kinds_round_trip() {
        for msg in [
            SessionMessage::session_ready(),
            SessionMessage::user("hello"),
            SessionMessage::assistant("hi there"),
        ] {
            let json = serde_json::to_string(&msg).expect("should serialise");
            let restored: SessionMessage = serde_json::from_str(&json).expect("should parse");
            assert_eq!(restored, msg);
        }
    }

    #[test]
    fn missing_text_is_none() {
        let msg: SessionMessage =
            serde_json::from_str(r#"{"kind": "session_ready"}"#).expect("should parse");
        assert_eq!(msg.text, None);
    }

    #[test]
    fn spoken_text_only_for_user_utterances() {
        assert_eq!(SessionMessage::user("hi").spoken_text(), Some("hi"));
        assert_eq!(SessionMessage::user("").spoken_text(), None);
        assert_eq!(SessionMessage::assistant("hi").spoken_text(), None);
        assert_eq!(SessionMessage::session_ready().spoken_text(), None);
    }
}
