//! Client configuration.
//!
//! A client trusts exactly one authority, identified by two public keys: the
//! Ed25519 key that signs certificates and the X25519 key message keys are
//! escrowed to. Both are carried hex-encoded so a config can be loaded from
//! JSON:
//!
//! ```json
//! {
//!   "authority": {
//!     "verifying_key": "<64 hex chars>",
//!     "escrow_public_key": "<64 hex chars>"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use warrant_crypto::{PublicKey, VerifyingKey};

use crate::error::ClientError;

/// Public keys of the trusted authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityKeys {
    /// Ed25519 key that signs certificates.
    #[serde(with = "warrant_proto::hex_key")]
    pub verifying_key: [u8; 32],

    /// X25519 key that message keys are escrowed to.
    #[serde(with = "warrant_proto::hex_key")]
    pub escrow_public_key: [u8; 32],
}

impl AuthorityKeys {
    /// Parse the verifying key.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the bytes are not a valid Ed25519 point
    pub fn verifying_key(&self) -> Result<VerifyingKey, ClientError> {
        VerifyingKey::from_bytes(&self.verifying_key)
            .map_err(|e| ClientError::InvalidConfig { reason: format!("verifying key: {e}") })
    }

    /// The escrow public key.
    pub fn escrow_public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.escrow_public_key)
    }
}

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The authority this client trusts and escrows to.
    pub authority: AuthorityKeys,
}

impl ClientConfig {
    /// Create a config trusting `authority`.
    pub fn new(authority: AuthorityKeys) -> Self {
        Self { authority }
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        serde_json::from_str(json).map_err(|e| ClientError::InvalidConfig { reason: e.to_string() })
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, ClientError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::InvalidConfig { reason: e.to_string() })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use warrant_crypto::SigningKeyPair;

    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new(AuthorityKeys {
            verifying_key: SigningKeyPair::from_seed(&[0x11; 32]).verifying_key().to_bytes(),
            escrow_public_key: [0x22; 32],
        })
    }

    #[test]
    fn json_roundtrip() {
        let config = config();
        let json = config.to_json().unwrap();
        assert_eq!(ClientConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn keys_are_hex_in_json() {
        let json = config().to_json().unwrap();
        assert!(json.contains(&"22".repeat(32)));
    }

    #[test]
    fn rejects_short_key() {
        let json = r#"{"authority":{"verifying_key":"abcd","escrow_public_key":"abcd"}}"#;
        let result = ClientConfig::from_json(json);
        assert!(matches!(result, Err(ClientError::InvalidConfig { .. })));
    }

    #[test]
    fn rejects_missing_authority() {
        let result = ClientConfig::from_json("{}");
        assert!(matches!(result, Err(ClientError::InvalidConfig { .. })));
    }

    #[test]
    fn verifying_key_parses() {
        let config = config();
        let key = config.authority.verifying_key().unwrap();
        assert_eq!(key.to_bytes(), config.authority.verifying_key);
    }
}
