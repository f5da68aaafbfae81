//! Warrant Cryptographic Primitives
//!
//! Cryptographic building blocks for the Warrant escrowed double ratchet.
//! Pure functions with deterministic outputs. Callers provide random bytes
//! (ephemeral secrets, nonces) for deterministic testing.
//!
//! # Key Lifecycle
//!
//! Two parties share a static secret from their certified X25519 identity
//! keys. Every change of direction mixes a fresh Diffie-Hellman output into
//! the root key, which yields a new chain. Each chain produces one message
//! key per message, and each message key is additionally wrapped for the
//! escrow authority.
//!
//! ```text
//! DH(identity, peer identity)
//!        │
//!        ▼
//! Root KDF (HKDF, salt = root key) ◄── DH ratchet output
//!        │
//!        ▼
//! Chain Key ──HMAC──► Chain Key ──HMAC──► ...
//!        │                 │
//!        ▼                 ▼
//!   Message Key       Message Key ──► AES-128-GCM payload
//!                          │
//!                          ▼
//!                  Escrow wrap (ephemeral DH to authority)
//! ```
//!
//! # Security
//!
//! Forward Secrecy:
//! - Chain advancement: the next chain key is an HMAC of the previous one,
//!   and the previous one is zeroized when the session replaces it
//! - Message key disposal: keys are zeroized on drop after single use
//!
//! Post-Compromise Security:
//! - Every direction change performs a DH ratchet step with a fresh key pair
//! - The root key is replaced, never combined, on every step
//!
//! Escrow:
//! - Every message key is wrapped under a fresh ephemeral DH secret toward the
//!   authority's public key; escrow material is never reused across messages

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod aead;
pub mod chain;
mod error;
pub mod escrow;
pub mod kdf;
pub mod keys;
pub mod signature;

pub use aead::{NONCE_SIZE, open_message, seal_message};
pub use chain::{CHAIN_KEY_SIZE, ChainKey, MESSAGE_KEY_SIZE, MessageKey, advance_chain};
pub use error::CryptoError;
pub use escrow::{EscrowedKey, recover_message_key, wrap_for_authority};
pub use kdf::{RootKey, root_kdf};
pub use keys::{KeyPair, PUBLIC_KEY_SIZE, PublicKey, SECRET_KEY_SIZE, SharedSecret};
pub use signature::{SIGNATURE_SIZE, SigningKeyPair, VerifyingKey};
