//! Symmetric chain ratchet for per-message key derivation
//!
//! # Security Properties
//!
//! - Forward Secrecy: the next chain key is `HMAC(chain_key, "chainKey")`;
//!   earlier chain keys cannot be recovered from later ones
//! - Key Uniqueness: each step produces a distinct message key
//! - Determinism: the same chain key always produces the same step

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroize;

type HmacSha256 = Hmac<Sha256>;

/// Label for deriving the next chain key
const CHAIN_LABEL: &[u8] = b"chainKey";

/// Size of a chain key in bytes (256 bits)
pub const CHAIN_KEY_SIZE: usize = 32;

/// Size of a message key in bytes (128 bits)
pub const MESSAGE_KEY_SIZE: usize = 16;

/// A chain key, advanced once per message in one direction.
#[derive(Clone)]
pub struct ChainKey {
    key: [u8; CHAIN_KEY_SIZE],
}

impl ChainKey {
    /// Wrap raw chain key bytes.
    pub fn from_bytes(key: [u8; CHAIN_KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Raw chain key bytes.
    pub fn as_bytes(&self) -> &[u8; CHAIN_KEY_SIZE] {
        &self.key
    }

    /// Derive the next chain key and the message key for this step.
    ///
    /// `self` is left untouched; the caller replaces its stored chain key
    /// with the returned one and drops the old one.
    pub fn advance(&self) -> (ChainKey, MessageKey) {
        let Ok(mut mac) = HmacSha256::new_from_slice(&self.key) else {
            unreachable!("HMAC-SHA256 accepts any key size");
        };
        mac.update(CHAIN_LABEL);
        let result = mac.finalize().into_bytes();

        let mut next = [0u8; CHAIN_KEY_SIZE];
        next.copy_from_slice(&result);

        let mut message = [0u8; MESSAGE_KEY_SIZE];
        message.copy_from_slice(&next[..MESSAGE_KEY_SIZE]);

        (ChainKey { key: next }, MessageKey { key: message })
    }
}

impl Drop for ChainKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl fmt::Debug for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChainKey([REDACTED])")
    }
}

/// Advance a chain one step: `(next_chain_key, message_key)`.
pub fn advance_chain(chain_key: &ChainKey) -> (ChainKey, MessageKey) {
    chain_key.advance()
}

/// A message key derived from a chain.
///
/// Used for exactly one encryption or decryption, then dropped.
#[derive(Clone)]
pub struct MessageKey {
    /// 16-byte AES-128-GCM key
    key: [u8; MESSAGE_KEY_SIZE],
}

impl MessageKey {
    /// Wrap raw message key bytes.
    pub fn from_bytes(key: [u8; MESSAGE_KEY_SIZE]) -> Self {
        Self { key }
    }

    /// 16-byte symmetric key.
    pub fn key(&self) -> &[u8; MESSAGE_KEY_SIZE] {
        &self.key
    }
}

impl Drop for MessageKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MessageKey([REDACTED])")
    }
}
