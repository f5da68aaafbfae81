//! X25519 key pairs and Diffie-Hellman.
//!
//! Key pairs are built from caller-provided secret bytes so that every key in
//! a session can be reproduced from a seeded environment in tests.

use std::fmt;

use x25519_dalek::StaticSecret;
use zeroize::Zeroize;

use crate::error::CryptoError;

/// Size of an X25519 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Size of an X25519 secret key in bytes
pub const SECRET_KEY_SIZE: usize = 32;

/// Number of leading bytes shown in a fingerprint
const FINGERPRINT_BYTES: usize = 4;

/// X25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_SIZE]);

impl PublicKey {
    /// Wrap raw public key bytes.
    pub fn from_bytes(bytes: [u8; PUBLIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.0
    }

    /// Owned copy of the public key bytes.
    pub fn to_bytes(self) -> [u8; PUBLIC_KEY_SIZE] {
        self.0
    }

    /// Short hex prefix suitable for logs.
    pub fn fingerprint(&self) -> String {
        self.0[..FINGERPRINT_BYTES].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = CryptoError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let key: [u8; PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            CryptoError::InvalidKeyLength { expected: PUBLIC_KEY_SIZE, actual: bytes.len() }
        })?;
        Ok(Self(key))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

/// Output of an X25519 Diffie-Hellman computation.
///
/// Zeroized on drop.
#[derive(Clone)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {
    /// Raw shared secret bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// X25519 key pair used for identities, ratchet steps and escrow ephemerals.
#[derive(Clone)]
pub struct KeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl KeyPair {
    /// Build a key pair from 32 secret bytes.
    ///
    /// The bytes are clamped by X25519, so any 32 random bytes are a valid
    /// secret. Callers MUST supply cryptographically secure randomness in
    /// production.
    pub fn from_secret_bytes(mut bytes: [u8; SECRET_KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(bytes);
        bytes.zeroize();
        let public = PublicKey(x25519_dalek::PublicKey::from(&secret).to_bytes());
        Self { secret, public }
    }

    /// Public half of this key pair.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }

    /// Compute `DH(self.secret, peer)`.
    pub fn diffie_hellman(&self, peer: &PublicKey) -> SharedSecret {
        let peer = x25519_dalek::PublicKey::from(peer.0);
        SharedSecret(self.secret.diffie_hellman(&peer).to_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
