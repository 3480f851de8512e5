//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature bytes have the wrong length
    #[error("Invalid signature length: expected {expected}, got {actual}")]
    InvalidSignatureLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Recovery id is not 0, 1, 27 or 28
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// r or s is not a valid scalar
    #[error("Invalid signature")]
    InvalidSignature,

    /// Public key recovery failed
    #[error("Public key recovery failed")]
    RecoveryFailed,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}
