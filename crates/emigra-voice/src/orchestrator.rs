//! Composition of quota, connection, handshake, and transcript extraction.

use emigra_store::UsageStore;
use emigra_types::{CallerProfile, SessionMessage, SessionStatus};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::VoiceConfig;
use crate::error::VoiceError;
use crate::handshake::PersonalizationHandshake;
use crate::port::ConversationPort;
use crate::quota::UsageQuota;
use crate::session::SessionController;
use crate::token::CredentialIssuer;
use crate::trace::DiagnosticTrace;
use crate::transcript::{TranscriptExtractor, TranscriptSink};

/// Drives one caller's voice sessions end to end.
///
/// Gates connection attempts on the anonymous usage quota, fetches the
/// session credential, owns the connection controller, and feeds every
/// provider message through the personalization handshake and the
/// transcript extractor. Exactly one session is active per orchestrator at
/// a time; the usage counter outlives all of them.
pub struct VoiceOrchestrator<P, S, C> {
    config: VoiceConfig,
    controller: SessionController<P>,
    credentials: C,
    quota: UsageQuota<S>,
    handshake: PersonalizationHandshake,
    transcript: TranscriptExtractor,
    trace: DiagnosticTrace,
    authenticated: bool,
    has_connected_once: bool,
}

impl<P, S, C> VoiceOrchestrator<P, S, C>
where
    P: ConversationPort,
    S: UsageStore,
    C: CredentialIssuer,
{
    pub fn new(
        config: VoiceConfig,
        port: P,
        store: S,
        credentials: C,
        profile: Option<CallerProfile>,
        authenticated: bool,
        transcript_sink: Option<TranscriptSink>,
    ) -> Self {
        let quota = UsageQuota::new(store, config.max_free_uses);
        let trace = DiagnosticTrace::new(config.trace_capacity);
        Self {
            config,
            controller: SessionController::new(port),
            credentials,
            quota,
            handshake: PersonalizationHandshake::new(profile, authenticated),
            transcript: TranscriptExtractor::new(transcript_sink),
            trace,
            authenticated,
            has_connected_once: false,
        }
    }

    /// Opens a new session, enforcing the anonymous usage quota.
    ///
    /// Anonymous callers at or over the cap are rejected before any
    /// credential fetch or provider call. The counter is incremented once,
    /// after the first successful connection of this orchestrator instance;
    /// reconnects within the same instance do not increment again.
    pub async fn connect(&mut self) -> Result<(), VoiceError> {
        if !self.authenticated && self.quota.exhausted() {
            self.trace.append("connect blocked: free session limit reached");
            tracing::info!(
                used = self.quota.read(),
                limit = self.quota.limit(),
                "anonymous caller over free session limit"
            );
            return Err(VoiceError::QuotaExceeded);
        }

        let attempt = self.controller.begin()?;
        self.handshake.reset();
        self.transcript.reset();
        self.trace.append("requesting session credential");

        let credential = match self.credentials.issue().await {
            Ok(credential) => credential,
            Err(e) => {
                self.controller.abort(attempt, "voice service unavailable");
                self.trace.append(format!("credential fetch failed: {e}"));
                return Err(e);
            }
        };

        self.trace.append("opening session");
        if let Err(e) = self
            .controller
            .establish(attempt, &credential, &self.config.agent_id)
            .await
        {
            self.trace.append(format!("connection failed: {e}"));
            return Err(e);
        }
        self.trace.append("session connected");

        if !self.authenticated && !self.has_connected_once {
            self.has_connected_once = true;
            match self.quota.increment() {
                Ok(used) => self.trace.append(format!(
                    "free session {used} of {} consumed",
                    self.quota.limit()
                )),
                // Fail open: a broken counter never tears down a live session.
                Err(e) => self.trace.append(format!("usage counter write failed: {e}")),
            }
        }

        Ok(())
    }

    /// Feeds one provider message through the handshake and transcript
    /// steps.
    ///
    /// Infallible: every failure path lands in the trace or the session
    /// error field rather than propagating. Safe to call repeatedly; the
    /// handshake flag and transcript cursor keep it idempotent.
    pub async fn handle_message(&mut self, message: SessionMessage) {
        self.controller.ingest(message);

        if let Some(variables) = self.handshake.due(self.controller.messages()) {
            match self.controller.send_settings(&variables).await {
                Ok(()) => self.trace.append("personalization variables sent"),
                Err(e) => self.trace.append(format!("personalization send failed: {e}")),
            }
            // At most one transmission per session, even when the send fails.
            self.handshake.mark_sent();
        }

        self.transcript.scan(self.controller.messages());
    }

    /// Pumps provider messages until the sending side closes.
    pub async fn drive(&mut self, mut messages: mpsc::UnboundedReceiver<SessionMessage>) {
        while let Some(message) = messages.recv().await {
            self.handle_message(message).await;
        }
    }

    /// Closes the active session and re-arms the handshake for the next
    /// one.
    pub fn disconnect(&mut self) {
        self.controller.disconnect();
        self.handshake.reset();
        self.trace.append("session closed");
    }

    pub fn status(&self) -> SessionStatus {
        self.controller.status()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.controller.last_error()
    }

    pub fn messages(&self) -> &[SessionMessage] {
        self.controller.messages()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.controller.session_id()
    }

    /// True when an anonymous caller has consumed every free session.
    /// Authenticated callers never touch the counter.
    pub fn quota_exhausted(&self) -> bool {
        !self.authenticated && self.quota.exhausted()
    }

    /// Free sessions left for an anonymous caller; `None` for authenticated
    /// callers, whose usage is not metered.
    pub fn free_uses_remaining(&self) -> Option<u32> {
        if self.authenticated {
            None
        } else {
            Some(self.quota.remaining())
        }
    }

    pub fn trace(&self) -> &DiagnosticTrace {
        &self.trace
    }
}
