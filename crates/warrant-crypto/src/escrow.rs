//! Escrow wrapping of message keys for the authority.
//!
//! Every message key is encrypted a second time under a key derived from a
//! fresh ephemeral X25519 exchange with the authority's public key. The
//! authority can later recover the key with its secret; nobody else can.
//!
//! ```text
//! ephemeral secret ──DH──► authority public key
//!                   │
//!                   ▼
//!         first 16 bytes = wrap key
//!                   │
//!                   ▼
//!     AES-128-GCM(wrap key, message key) = wrapped key
//! ```

use crate::{
    aead::{self, NONCE_SIZE},
    chain::{MESSAGE_KEY_SIZE, MessageKey},
    error::CryptoError,
    keys::{KeyPair, PublicKey, SECRET_KEY_SIZE, SharedSecret},
};

/// A message key wrapped for the escrow authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowedKey {
    /// Ephemeral public key used for this wrap (`vGov` on the wire)
    pub ephemeral_public: PublicKey,
    /// Sealed message key (`cGov` on the wire)
    pub wrapped_key: Vec<u8>,
}

/// Derive the 128-bit wrap key from the escrow DH output.
fn wrap_key(shared: &SharedSecret) -> [u8; MESSAGE_KEY_SIZE] {
    let mut key = [0u8; MESSAGE_KEY_SIZE];
    key.copy_from_slice(&shared.as_bytes()[..MESSAGE_KEY_SIZE]);
    key
}

/// Wrap `message_key` for the authority.
///
/// `ephemeral_secret` MUST be fresh randomness for every call; reusing it
/// would let the authority link messages by their `vGov` and would reuse the
/// wrap key under a new nonce.
pub fn wrap_for_authority(
    authority_public: &PublicKey,
    message_key: &MessageKey,
    ephemeral_secret: [u8; SECRET_KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
) -> EscrowedKey {
    let ephemeral = KeyPair::from_secret_bytes(ephemeral_secret);
    let shared = ephemeral.diffie_hellman(authority_public);
    let key = wrap_key(&shared);

    EscrowedKey {
        ephemeral_public: ephemeral.public_key(),
        wrapped_key: aead::seal(&key, message_key.key(), &[], nonce),
    }
}

/// Recover a wrapped message key with the authority's key pair.
///
/// # Errors
///
/// - `DecryptionFailed`: the wrap was altered or was not made for this
///   authority
/// - `InvalidKeyLength`: the unwrapped value is not a 128-bit key
pub fn recover_message_key(
    authority: &KeyPair,
    ephemeral_public: &PublicKey,
    wrapped_key: &[u8],
) -> Result<MessageKey, CryptoError> {
    let shared = authority.diffie_hellman(ephemeral_public);
    let key = wrap_key(&shared);

    let recovered = aead::open(&key, wrapped_key, &[])?;
    let bytes: [u8; MESSAGE_KEY_SIZE] = recovered.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidKeyLength { expected: MESSAGE_KEY_SIZE, actual: recovered.len() }
    })?;

    Ok(MessageKey::from_bytes(bytes))
}
