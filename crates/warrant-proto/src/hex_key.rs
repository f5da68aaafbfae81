//! Hex encoding of 32-byte keys.
//!
//! Usable as `#[serde(with = "warrant_proto::hex_key")]` on `[u8; 32]` fields.

use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

use crate::error::{ProtocolError, Result};

/// Length of a key handled by this module
const KEY_SIZE: usize = 32;

/// Decode a lowercase or uppercase hex string into a 32-byte key.
pub fn decode(encoded: &str) -> Result<[u8; KEY_SIZE]> {
    let bytes =
        hex::decode(encoded).map_err(|e| ProtocolError::InvalidHex { reason: e.to_string() })?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| ProtocolError::InvalidKeyLength { expected: KEY_SIZE, actual: len })
}

/// Encode a 32-byte key as lowercase hex.
pub fn encode(key: &[u8; KEY_SIZE]) -> String {
    hex::encode(key)
}

/// Serde serializer for `[u8; 32]` as hex.
pub fn serialize<S: Serializer>(
    key: &[u8; KEY_SIZE],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&encode(key))
}

/// Serde deserializer for `[u8; 32]` from hex.
pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<[u8; KEY_SIZE], D::Error> {
    let encoded = String::deserialize(deserializer)?;
    decode(&encoded).map_err(D::Error::custom)
}
