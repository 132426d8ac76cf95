//! Port over the external conversational-session provider.

use std::collections::BTreeMap;

use crate::error::VoiceError;

/// Narrow interface over the speech provider's real-time SDK.
///
/// The provider owns the transport, audio capture, and playback; this crate
/// only drives the session lifecycle and the one-shot settings transmission
/// through it. Tests substitute a deterministic fake.
#[allow(async_fn_in_trait)]
pub trait ConversationPort {
    /// Opens a real-time session using a short-lived credential and the
    /// provider-side agent configuration id. Resolves once the provider
    /// acknowledges the connection.
    async fn open(&mut self, credential: &str, agent_id: &str) -> Result<(), VoiceError>;

    /// Tears down the active transport. Must be safe to call when nothing
    /// is open.
    fn close(&mut self);

    /// Transmits the session settings carrying the personalization
    /// variables. The provider accepts at most one such call per session.
    async fn send_settings(
        &mut self,
        variables: &BTreeMap<String, String>,
    ) -> Result<(), VoiceError>;
}
