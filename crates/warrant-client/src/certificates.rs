//! Authority-verified peer certificates.
//!
//! A certificate enters the store only after the authority's Ed25519
//! signature over its canonical form verifies. Acceptance is all-or-nothing:
//! a rejected certificate leaves the store as it was.

use std::collections::HashMap;

use warrant_crypto::{PublicKey, VerifyingKey};
use warrant_proto::{Certificate, CertificateForm};

use crate::error::ClientError;

/// Certificates of known peers, keyed by identity label.
///
/// # Invariants
///
/// - Every stored certificate carried a valid authority signature when it
///   was accepted
/// - At most one certificate per identity (re-acceptance replaces)
#[derive(Debug, Default, Clone)]
pub struct CertificateStore {
    certificates: HashMap<String, Certificate>,
}

impl CertificateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verify and store a certificate.
    ///
    /// The signature is checked against the canonical form before the
    /// contents are trusted. A pre-serialized form is verified byte-for-byte
    /// as given.
    ///
    /// # Errors
    ///
    /// - `MalformedCertificate` if the form cannot be canonicalized, or it
    ///   verifies but its contents do not parse
    /// - `InvalidCertificate` if the signature does not verify
    pub fn accept(
        &mut self,
        authority: &VerifyingKey,
        form: &CertificateForm,
        signature: &[u8],
    ) -> Result<Certificate, ClientError> {
        let canonical = form
            .canonical()
            .map_err(|e| ClientError::MalformedCertificate { reason: e.to_string() })?;

        if authority.verify(canonical.as_bytes(), signature).is_err() {
            let identity = form.parse().ok().map(|certificate| certificate.identity);
            tracing::warn!(
                identity = identity.as_deref().unwrap_or("<unparsed>"),
                "rejected certificate: authority signature invalid"
            );
            return Err(ClientError::InvalidCertificate { identity });
        }

        let certificate =
            form.parse().map_err(|e| ClientError::MalformedCertificate { reason: e.to_string() })?;

        let fingerprint = PublicKey::from_bytes(certificate.public_key).fingerprint();
        if let Some(previous) =
            self.certificates.insert(certificate.identity.clone(), certificate.clone())
        {
            if previous.public_key != certificate.public_key {
                tracing::info!(
                    identity = %certificate.identity,
                    key = %fingerprint,
                    "replaced certificate with new key"
                );
            }
        } else {
            tracing::info!(
                identity = %certificate.identity,
                key = %fingerprint,
                "accepted certificate"
            );
        }

        Ok(certificate)
    }

    /// Certificate for `identity`, if accepted.
    pub fn get(&self, identity: &str) -> Option<&Certificate> {
        self.certificates.get(identity)
    }

    /// Public key certified for `identity`, if accepted.
    pub fn public_key(&self, identity: &str) -> Option<PublicKey> {
        self.get(identity).map(|certificate| PublicKey::from_bytes(certificate.public_key))
    }

    /// Check if a certificate for `identity` is on file.
    pub fn contains(&self, identity: &str) -> bool {
        self.certificates.contains_key(identity)
    }

    /// Number of accepted certificates.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// True if no certificate has been accepted.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use warrant_crypto::SigningKeyPair;

    use super::*;

    fn authority() -> SigningKeyPair {
        SigningKeyPair::from_seed(&[0x42; 32])
    }

    fn signed(identity: &str, key: [u8; 32]) -> (CertificateForm, [u8; 64]) {
        let certificate = Certificate::new(identity, key);
        let signature = authority().sign(certificate.to_canonical_json().unwrap().as_bytes());
        (CertificateForm::from(certificate), signature)
    }

    #[test]
    fn accepts_valid_certificate() {
        let mut store = CertificateStore::new();
        let (form, signature) = signed("bob", [0x01; 32]);

        let accepted = store.accept(&authority().verifying_key(), &form, &signature).unwrap();

        assert_eq!(accepted.identity, "bob");
        assert_eq!(store.public_key("bob"), Some(PublicKey::from_bytes([0x01; 32])));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn accepts_serialized_form_verbatim() {
        let mut store = CertificateStore::new();
        let json = Certificate::new("carol", [0x02; 32]).to_canonical_json().unwrap();
        let signature = authority().sign(json.as_bytes());

        store
            .accept(&authority().verifying_key(), &CertificateForm::from(json), &signature)
            .unwrap();

        assert!(store.contains("carol"));
    }

    #[test]
    fn rejects_tampered_key() {
        let mut store = CertificateStore::new();
        let (_, signature) = signed("bob", [0x01; 32]);
        let forged = CertificateForm::from(Certificate::new("bob", [0x66; 32]));

        let result = store.accept(&authority().verifying_key(), &forged, &signature);

        assert_eq!(result, Err(ClientError::InvalidCertificate { identity: Some("bob".into()) }));
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_foreign_authority() {
        let mut store = CertificateStore::new();
        let (form, signature) = signed("bob", [0x01; 32]);
        let other = SigningKeyPair::from_seed(&[0x43; 32]).verifying_key();

        let result = store.accept(&other, &form, &signature);

        assert!(matches!(result, Err(ClientError::InvalidCertificate { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn signed_garbage_is_malformed_not_trusted() {
        let mut store = CertificateStore::new();
        let garbage = String::from("{\"identity\":\"bob\"}");
        let signature = authority().sign(garbage.as_bytes());

        let result =
            store.accept(&authority().verifying_key(), &CertificateForm::from(garbage), &signature);

        assert!(matches!(result, Err(ClientError::MalformedCertificate { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn reacceptance_replaces_entry() {
        let mut store = CertificateStore::new();
        let verifying_key = authority().verifying_key();

        let (first, first_sig) = signed("bob", [0x01; 32]);
        let (second, second_sig) = signed("bob", [0x02; 32]);
        store.accept(&verifying_key, &first, &first_sig).unwrap();
        store.accept(&verifying_key, &second, &second_sig).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.public_key("bob"), Some(PublicKey::from_bytes([0x02; 32])));
    }
}
