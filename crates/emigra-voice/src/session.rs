//! Session connection lifecycle.

use std::collections::BTreeMap;

use emigra_types::{SessionMessage, SessionStatus};
use uuid::Uuid;

use crate::error::VoiceError;
use crate::port::ConversationPort;

/// Token for one connection attempt.
///
/// `establish` and `abort` apply their outcome only while the attempt still
/// matches the controller's current generation; an attempt superseded by
/// `disconnect` is discarded instead of resurrecting the torn-down session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectAttempt {
    generation: u64,
}

/// Owns the provider port, the status machine, and the append-only message
/// log of the active session.
///
/// Lifecycle: `idle --begin--> connecting --establish ok--> connected`;
/// `connecting` on failure lands in `error`, which is not terminal: a later
/// `begin` retries. `disconnect` always returns to `idle`.
#[derive(Debug)]
pub struct SessionController<P> {
    port: P,
    status: SessionStatus,
    last_error: Option<String>,
    messages: Vec<SessionMessage>,
    session_id: Option<Uuid>,
    generation: u64,
    connecting: bool,
}

impl<P: ConversationPort> SessionController<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            status: SessionStatus::Idle,
            last_error: None,
            messages: Vec::new(),
            session_id: None,
            generation: 0,
            connecting: false,
        }
    }

    /// Starts a connection attempt.
    ///
    /// Rejects re-entry while a prior attempt is pending. Clears the
    /// previous session's message log; the log belongs to exactly one
    /// session.
    pub fn begin(&mut self) -> Result<ConnectAttempt, VoiceError> {
        if self.connecting {
            return Err(VoiceError::AlreadyConnecting);
        }
        self.connecting = true;
        self.generation += 1;
        self.status = SessionStatus::Connecting;
        self.last_error = None;
        self.messages.clear();
        self.session_id = None;
        Ok(ConnectAttempt {
            generation: self.generation,
        })
    }

    /// Opens the transport for a previously begun attempt.
    ///
    /// A success that lands after an intervening `disconnect` is discarded:
    /// the transport is closed again and the controller stays where the
    /// disconnect left it.
    pub async fn establish(
        &mut self,
        attempt: ConnectAttempt,
        credential: &str,
        agent_id: &str,
    ) -> Result<(), VoiceError> {
        let outcome = self.port.open(credential, agent_id).await;

        if attempt.generation != self.generation {
            self.port.close();
            tracing::debug!("discarding superseded connection attempt");
            return Err(VoiceError::Connection(
                "connection attempt superseded".to_string(),
            ));
        }

        self.connecting = false;
        match outcome {
            Ok(()) => {
                let id = Uuid::new_v4();
                self.status = SessionStatus::Connected;
                self.session_id = Some(id);
                tracing::info!(session_id = %id, "session connected");
                Ok(())
            }
            Err(e) => {
                self.status = SessionStatus::Error;
                self.last_error = Some(e.to_string());
                tracing::warn!(error = %e, "session connection failed");
                Err(e)
            }
        }
    }

    /// Records a failure that happened before the transport was opened,
    /// such as a credential fetch error.
    pub fn abort(&mut self, attempt: ConnectAttempt, reason: &str) {
        if attempt.generation != self.generation {
            return;
        }
        self.connecting = false;
        self.status = SessionStatus::Error;
        self.last_error = Some(reason.to_string());
    }

    /// Tears down the active session. Idempotent; safe while idle.
    pub fn disconnect(&mut self) {
        self.generation += 1;
        self.connecting = false;
        self.port.close();
        if self.status != SessionStatus::Idle {
            tracing::info!("session closed");
        }
        self.status = SessionStatus::Idle;
        self.session_id = None;
    }

    /// Appends a provider message to the session log.
    ///
    /// Messages arriving outside an active session (after teardown, or in
    /// the `error` state) are dropped; the log belongs to one session.
    pub fn ingest(&mut self, message: SessionMessage) {
        match self.status {
            SessionStatus::Connecting | SessionStatus::Connected => self.messages.push(message),
            SessionStatus::Idle | SessionStatus::Error => {
                tracing::debug!("dropping message received outside an active session");
            }
        }
    }

    /// Forwards the one-shot session settings to the provider.
    pub async fn send_settings(
        &mut self,
        variables: &BTreeMap<String, String>,
    ) -> Result<(), VoiceError> {
        if self.status != SessionStatus::Connected {
            return Err(VoiceError::NotConnected);
        }
        self.port.send_settings(variables).await
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn messages(&self) -> &[SessionMessage] {
        &self.messages
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted port recording lifecycle calls.
    #[derive(Debug, Default)]
    struct ScriptedPort {
        open_calls: u32,
        close_calls: u32,
        settings: Vec<BTreeMap<String, String>>,
        fail_next_open: bool,
    }

    impl ConversationPort for ScriptedPort {
        async fn open(&mut self, _credential: &str, _agent_id: &str) -> Result<(), VoiceError> {
            self.open_calls += 1;
            if self.fail_next_open {
                self.fail_next_open = false;
                return Err(VoiceError::Connection("provider refused".to_string()));
            }
            Ok(())
        }

        fn close(&mut self) {
            self.close_calls += 1;
        }

        async fn send_settings(
            &mut self,
            variables: &BTreeMap<String, String>,
        ) -> Result<(), VoiceError> {
            self.settings.push(variables.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn connect_success_path() {
        let mut controller = SessionController::new(ScriptedPort::default());
        assert_eq!(controller.status(), SessionStatus::Idle);

        let attempt = controller.begin().expect("begin should succeed");
        assert_eq!(controller.status(), SessionStatus::Connecting);
        assert!(controller.is_connecting());

        controller
            .establish(attempt, "cred", "agent_1")
            .await
            .expect("establish should succeed");

        assert_eq!(controller.status(), SessionStatus::Connected);
        assert!(controller.session_id().is_some());
        assert!(!controller.is_connecting());
    }

    #[tokio::test]
    async fn connect_failure_is_retryable() {
        let mut port = ScriptedPort::default();
        port.fail_next_open = true;
        let mut controller = SessionController::new(port);

        let attempt = controller.begin().expect("begin should succeed");
        let err = controller
            .establish(attempt, "cred", "agent_1")
            .await
            .expect_err("establish should fail");
        assert!(matches!(err, VoiceError::Connection(_)));
        assert_eq!(controller.status(), SessionStatus::Error);
        assert_eq!(controller.last_error(), Some("connection error: provider refused"));

        // Error is not terminal: a fresh attempt proceeds.
        let attempt = controller.begin().expect("retry begin should succeed");
        controller
            .establish(attempt, "cred", "agent_1")
            .await
            .expect("retry should succeed");
        assert_eq!(controller.status(), SessionStatus::Connected);
    }

    #[tokio::test]
    async fn begin_rejects_reentry() {
        let mut controller = SessionController::new(ScriptedPort::default());
        let _attempt = controller.begin().expect("begin should succeed");

        let err = controller.begin().expect_err("second begin should fail");
        assert!(matches!(err, VoiceError::AlreadyConnecting));
    }

    #[tokio::test]
    async fn stale_success_after_disconnect_is_discarded() {
        let mut controller = SessionController::new(ScriptedPort::default());

        let attempt = controller.begin().expect("begin should succeed");
        controller.disconnect();

        let err = controller
            .establish(attempt, "cred", "agent_1")
            .await
            .expect_err("stale success should be discarded");
        assert!(matches!(err, VoiceError::Connection(_)));
        assert_eq!(controller.status(), SessionStatus::Idle);
        assert_eq!(controller.session_id(), None);
        assert!(controller.port.close_calls >= 1, "transport should be closed again");
    }

    #[tokio::test]
    async fn abort_applies_only_to_current_attempt() {
        let mut controller = SessionController::new(ScriptedPort::default());

        let stale = controller.begin().expect("begin should succeed");
        controller.disconnect();
        controller.abort(stale, "credential fetch failed");
        assert_eq!(controller.status(), SessionStatus::Idle, "stale abort is ignored");

        let attempt = controller.begin().expect("begin should succeed");
        controller.abort(attempt, "credential fetch failed");
        assert_eq!(controller.status(), SessionStatus::Error);
        assert_eq!(controller.last_error(), Some("credential fetch failed"));
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let mut controller = SessionController::new(ScriptedPort::default());
        controller.disconnect();
        controller.disconnect();
        assert_eq!(controller.status(), SessionStatus::Idle);
        assert_eq!(controller.port.close_calls, 2);
    }

    #[tokio::test]
    async fn begin_clears_previous_session_log() {
        let mut controller = SessionController::new(ScriptedPort::default());

        let attempt = controller.begin().expect("begin should succeed");
        controller
            .establish(attempt, "cred", "agent_1")
            .await
            .expect("establish should succeed");
        controller.ingest(SessionMessage::user("hello"));
        assert_eq!(controller.messages().len(), 1);

        controller.disconnect();
        let _attempt = controller.begin().expect("begin should succeed");
        assert!(controller.messages().is_empty());
    }

    #[tokio::test]
    async fn ingest_drops_messages_while_idle() {
        let mut controller = SessionController::new(ScriptedPort::default());
        controller.ingest(SessionMessage::user("ghost"));
        assert!(controller.messages().is_empty());
    }

    #[tokio::test]
    async fn send_settings_requires_connection() {
        let mut controller = SessionController::new(ScriptedPort::default());
        let err = controller
            .send_settings(&BTreeMap::new())
            .await
            .expect_err("should require a session");
        assert!(matches!(err, VoiceError::NotConnected));
    }
}
