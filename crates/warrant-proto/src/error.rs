//! Protocol-level errors for encoding and decoding wire types.

use thiserror::Error;

/// Result alias for wire type operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors that occur while encoding or decoding wire types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// CBOR serialization failed
    #[error("CBOR encode failed: {reason}")]
    CborEncode {
        /// Underlying serializer message
        reason: String,
    },

    /// CBOR input could not be decoded
    #[error("CBOR decode failed: {reason}")]
    CborDecode {
        /// Underlying deserializer message
        reason: String,
    },

    /// JSON (certificate) serialization or parsing failed
    #[error("certificate JSON invalid: {reason}")]
    Json {
        /// Underlying JSON error message
        reason: String,
    },

    /// Hex-encoded key could not be decoded
    #[error("invalid hex: {reason}")]
    InvalidHex {
        /// Underlying decoder message
        reason: String,
    },

    /// Decoded key has the wrong length
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes
        expected: usize,
        /// Length that was decoded
        actual: usize,
    },

    /// Wire message exceeds the maximum accepted size
    #[error("wire message too large: {size} bytes (max {max})")]
    MessageTooLarge {
        /// Size of the input
        size: usize,
        /// Maximum accepted size
        max: usize,
    },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json { reason: err.to_string() }
    }
}
