use emigra_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the voice session subsystem.
#[derive(Debug, Error)]
pub enum VoiceError {
    /// The credential endpoint was unreachable or returned non-success.
    #[error("voice service unavailable: {0}")]
    Credential(String),

    /// The provider rejected the connection or the transport failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider rejected the one-shot session settings transmission.
    #[error("settings transmission failed: {0}")]
    Settings(String),

    /// The anonymous caller has consumed every free session. A designed
    /// gate, not a fault.
    #[error("free session limit reached")]
    QuotaExceeded,

    /// A connection attempt is already pending.
    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,

    /// A session operation was issued while no session was active.
    #[error("no active session")]
    NotConnected,

    /// The client-side usage store failed.
    #[error("usage store error: {0}")]
    Store(#[from] StoreError),
}
