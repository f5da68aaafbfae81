//! Message header and wire message.
//!
//! The header travels in the clear next to the ciphertext and is bound to it
//! as associated data. Its canonical bytes are the CBOR encoding of
//! [`Header`], with every key field as a byte string; a receiver re-encodes
//! the decoded header to obtain the same bytes.
//!
//! # Invariants
//!
//! - Field order (`pubKey`, `vGov`, `cGov`) is part of the authenticated
//!   encoding and must not change.
//! - Encoding a decoded header reproduces the bytes the sender authenticated.

use serde::{Deserialize, Serialize};

use crate::{
    byte_string,
    error::{ProtocolError, Result},
};

/// Largest wire message accepted by [`WireMessage::decode`] (16 MiB).
pub const MAX_WIRE_SIZE: usize = 16 * 1024 * 1024;

/// Cleartext message header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Sender's current ratchet public key (X25519).
    #[serde(rename = "pubKey", with = "byte_string::array")]
    pub pub_key: [u8; 32],

    /// Escrow ephemeral public key (X25519).
    #[serde(rename = "vGov", with = "byte_string::array")]
    pub v_gov: [u8; 32],

    /// Message key wrapped for the escrow authority:
    /// `nonce (12) || sealed key (16) || tag (16)`.
    #[serde(rename = "cGov", with = "byte_string::vec")]
    pub c_gov: Vec<u8>,
}

impl Header {
    /// Canonical encoding used as associated data for the payload.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        ciborium::ser::into_writer(self, &mut encoded)
            .map_err(|e| ProtocolError::CborEncode { reason: e.to_string() })?;
        Ok(encoded)
    }
}

/// A message as it travels between clients: header plus sealed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Cleartext header, authenticated by the payload encryption.
    pub header: Header,

    /// Sealed payload: `nonce (12) || ciphertext || tag (16)`.
    #[serde(with = "byte_string::vec")]
    pub ciphertext: Vec<u8>,
}

impl WireMessage {
    /// Encode for transport.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        ciborium::ser::into_writer(self, &mut encoded)
            .map_err(|e| ProtocolError::CborEncode { reason: e.to_string() })?;
        Ok(encoded)
    }

    /// Decode from transport bytes.
    ///
    /// # Errors
    ///
    /// - `MessageTooLarge` if `bytes` exceeds [`MAX_WIRE_SIZE`]
    /// - `CborDecode` for anything that is not a well-formed wire message
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_WIRE_SIZE {
            return Err(ProtocolError::MessageTooLarge { size: bytes.len(), max: MAX_WIRE_SIZE });
        }

        ciborium::de::from_reader(bytes)
            .map_err(|e| ProtocolError::CborDecode { reason: e.to_string() })
    }
}
