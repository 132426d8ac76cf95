//! Voice session orchestration for the Emigra platform.
//!
//! Coordinates a real-time conversational session with the external speech
//! provider: a freemium usage quota for anonymous callers, the connection
//! lifecycle, a one-time personalization handshake gated on the remote
//! session reaching readiness, and incremental transcript extraction for a
//! downstream listener.
//!
//! All ordering and idempotency invariants are held in client-local state;
//! there is no server-side coordination. The provider and the credential
//! endpoint are reached through narrow ports ([`ConversationPort`],
//! [`CredentialIssuer`]) so tests run against deterministic fakes.

pub mod config;
pub mod error;
pub mod handshake;
pub mod orchestrator;
pub mod port;
pub mod quota;
pub mod session;
pub mod token;
pub mod trace;
pub mod transcript;

pub use config::{load_config, ConfigError, VoiceConfig};
pub use error::VoiceError;
pub use handshake::PersonalizationHandshake;
pub use orchestrator::VoiceOrchestrator;
pub use port::ConversationPort;
pub use quota::{UsageQuota, USAGE_COUNTER_KEY};
pub use session::{ConnectAttempt, SessionController};
pub use token::{CredentialIssuer, HttpCredentialIssuer};
pub use trace::{DiagnosticTrace, TraceEntry, DEFAULT_TRACE_CAPACITY};
pub use transcript::{TranscriptExtractor, TranscriptSink};
