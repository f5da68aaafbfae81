//! Identity certificates and their canonical form.
//!
//! A certificate binds an identity label to an X25519 public key. The
//! authority signs the canonical form, which is deterministic JSON with a
//! fixed field order:
//!
//! ```text
//! {"identity":"alice","public_key":"<64 hex chars>"}
//! ```
//!
//! Certificates may arrive already serialized (for example, copied verbatim
//! from the authority). The serialized string is then the signed message and
//! is used as-is, without re-encoding.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Binding of an identity label to a public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Identity label (peer name).
    pub identity: String,

    /// X25519 public key, hex-encoded in the canonical form.
    #[serde(with = "crate::hex_key")]
    pub public_key: [u8; 32],
}

impl Certificate {
    /// Create a certificate for `identity`.
    pub fn new(identity: impl Into<String>, public_key: [u8; 32]) -> Self {
        Self { identity: identity.into(), public_key }
    }

    /// Deterministic JSON form signed by the authority.
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a certificate from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The shapes in which a certificate may be presented for acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateForm {
    /// Structured certificate, canonicalized before verification.
    Structured(Certificate),
    /// Pre-serialized certificate, verified byte-for-byte as given.
    Serialized(String),
}

impl CertificateForm {
    /// The exact bytes the authority's signature covers.
    pub fn canonical(&self) -> Result<Cow<'_, str>> {
        match self {
            Self::Structured(certificate) => Ok(Cow::Owned(certificate.to_canonical_json()?)),
            Self::Serialized(serialized) => Ok(Cow::Borrowed(serialized)),
        }
    }

    /// Extract the certificate contents.
    ///
    /// # Errors
    ///
    /// - `Json` if a serialized form is not a well-formed certificate,
    ///   including a public key that is not 32 hex-encoded bytes
    pub fn parse(&self) -> Result<Certificate> {
        match self {
            Self::Structured(certificate) => Ok(certificate.clone()),
            Self::Serialized(serialized) => Certificate::from_json(serialized),
        }
    }
}

impl From<Certificate> for CertificateForm {
    fn from(certificate: Certificate) -> Self {
        Self::Structured(certificate)
    }
}

impl From<String> for CertificateForm {
    fn from(serialized: String) -> Self {
        Self::Serialized(serialized)
    }
}
