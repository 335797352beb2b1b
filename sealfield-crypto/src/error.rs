//! Crypto error types.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("malformed envelope: {0}")]
    Format(String),

    #[error("decryption failed (wrong key or tampered data)")]
    Authenticity,

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("plaintext exceeds asymmetric ceiling: {actual} bytes (limit {limit})")]
    InputTooLarge { limit: usize, actual: usize },

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("asymmetric operation failed: {0}")]
    Asymmetric(String),
}
