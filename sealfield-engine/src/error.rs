//! Engine error types.
//!
//! Collaborators at the transport boundary are expected to collapse every
//! variant into a generic failure response; the taxonomy exists for
//! operators and tests, not for clients (no oracle about which field or
//! step failed).

use crate::types::SessionId;
use sealfield_crypto::CryptoError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in the envelope encryption engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// KMS unreachable or failing after retries. Transient; retryable.
    #[error("key management service unavailable: {0}")]
    KeyUnavailable(String),

    /// No active wrapped-key record exists. Fatal; the system was never
    /// initialized. Not retried.
    #[error("no active wrapped key record (system not initialized)")]
    KeyRecordMissing,

    /// Client encryption mode is active or requested without a public key
    /// on file.
    #[error("client mode requires a registered public key")]
    MissingKeyMaterial,

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("session revoked: {0}")]
    SessionRevoked(SessionId),

    /// Commit presented a token that matches no pending mode change.
    #[error("unknown or already-consumed mode change token")]
    UnknownModeChange,

    #[error("master key already initialized")]
    AlreadyInitialized,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),
}
