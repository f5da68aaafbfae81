//! Authenticated encryption using AES-128-GCM
//!
//! All functions are pure - the nonce must be provided by the caller.
//!
//! Sealed layout: `nonce (12) || ciphertext || tag (16)`.

use aes_gcm::{
    Aes128Gcm, Key, Nonce,
    aead::{Aead, KeyInit, Payload},
};

use crate::{
    chain::{MESSAGE_KEY_SIZE, MessageKey},
    error::CryptoError,
};

/// Size of the AES-GCM nonce (12 bytes)
pub const NONCE_SIZE: usize = 12;

/// GCM tag size (16 bytes)
const TAG_SIZE: usize = 16;

/// Encrypt `plaintext` under a 128-bit key, binding `aad`.
///
/// Caller MUST provide a unique nonce per key. Message keys are single-use,
/// and escrow keys come from a fresh ephemeral DH each time, so a random
/// nonce is sufficient.
pub(crate) fn seal(
    key: &[u8; MESSAGE_KEY_SIZE],
    plaintext: &[u8],
    aad: &[u8],
    nonce: [u8; NONCE_SIZE],
) -> Vec<u8> {
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key));

    let Ok(ciphertext) =
        cipher.encrypt(Nonce::from_slice(&nonce), Payload { msg: plaintext, aad })
    else {
        unreachable!("AES-128-GCM encryption cannot fail with valid inputs");
    };

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    sealed
}

/// Decrypt a sealed payload produced by [`seal`].
///
/// # Errors
///
/// - `CiphertextTooShort`: input cannot hold a nonce and a tag
/// - `DecryptionFailed`: wrong key, tampered ciphertext, or mismatched `aad`
pub(crate) fn open(
    key: &[u8; MESSAGE_KEY_SIZE],
    sealed: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let min = NONCE_SIZE + TAG_SIZE;
    if sealed.len() < min {
        return Err(CryptoError::CiphertextTooShort { len: sealed.len(), min });
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key));

    cipher.decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad }).map_err(|_| {
        CryptoError::DecryptionFailed { reason: "authentication failed".to_string() }
    })
}

/// Encrypt a message payload under its message key.
///
/// `aad` is the canonical encoding of the message header.
pub fn seal_message(
    message_key: &MessageKey,
    plaintext: &[u8],
    aad: &[u8],
    nonce: [u8; NONCE_SIZE],
) -> Vec<u8> {
    seal(message_key.key(), plaintext, aad, nonce)
}

/// Decrypt a message payload under its message key.
pub fn open_message(
    message_key: &MessageKey,
    sealed: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    open(message_key.key(), sealed, aad)
}
