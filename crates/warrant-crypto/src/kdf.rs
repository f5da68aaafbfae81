//! Root key derivation using HKDF

use std::fmt;

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{chain::ChainKey, keys::SharedSecret};

/// Info label for the root KDF
const ROOT_KDF_INFO: &[u8] = b"rootKDF";

/// Size of a root key in bytes
const ROOT_KEY_SIZE: usize = 32;

/// The root of a session's key hierarchy.
///
/// Replaced on every DH ratchet step, never combined with its successor.
#[derive(Clone)]
pub struct RootKey {
    key: [u8; ROOT_KEY_SIZE],
}

impl RootKey {
    /// Wrap raw root key bytes.
    pub fn from_bytes(key: [u8; ROOT_KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Use a DH output directly as the initial root key.
    pub fn from_shared_secret(secret: &SharedSecret) -> Self {
        Self { key: *secret.as_bytes() }
    }

    /// Raw root key bytes.
    pub fn as_bytes(&self) -> &[u8; ROOT_KEY_SIZE] {
        &self.key
    }
}

impl Drop for RootKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RootKey([REDACTED])")
    }
}

/// Mix a DH output into the root key.
///
/// `HKDF-SHA256(ikm = dh_out, salt = root_key, info = "rootKDF")` expanded to
/// 64 bytes: the first half is the new root key, the second half the new
/// chain key.
pub fn root_kdf(root_key: &RootKey, dh_out: &SharedSecret) -> (RootKey, ChainKey) {
    let hkdf = Hkdf::<Sha256>::new(Some(root_key.key.as_slice()), dh_out.as_bytes());

    let mut okm = [0u8; 2 * ROOT_KEY_SIZE];
    let Ok(()) = hkdf.expand(ROOT_KDF_INFO, &mut okm) else {
        unreachable!("64 bytes is a valid HKDF-SHA256 output length");
    };

    let mut root = [0u8; ROOT_KEY_SIZE];
    let mut chain = [0u8; ROOT_KEY_SIZE];
    root.copy_from_slice(&okm[..ROOT_KEY_SIZE]);
    chain.copy_from_slice(&okm[ROOT_KEY_SIZE..]);
    okm.zeroize();

    (RootKey { key: root }, ChainKey::from_bytes(chain))
}
