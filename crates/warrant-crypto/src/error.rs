//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors produced by the primitive layer.
///
/// Encryption and key derivation are infallible; only operations that consume
/// attacker-controlled bytes (decryption, key parsing, signature checks) fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Authenticated decryption rejected the ciphertext
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Why decryption failed
        reason: String,
    },

    /// Sealed payload is shorter than nonce plus tag
    #[error("ciphertext too short: {len} bytes, need at least {min}")]
    CiphertextTooShort {
        /// Length that was provided
        len: usize,
        /// Minimum valid length
        min: usize,
    },

    /// Key material has the wrong length
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was provided
        actual: usize,
    },

    /// Ed25519 verifying key is not a valid curve point
    #[error("invalid verifying key")]
    InvalidVerifyingKey,

    /// Signature is malformed or does not verify
    #[error("invalid signature")]
    InvalidSignature,
}
