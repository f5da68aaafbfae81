//! The escrow authority.
//!
//! The authority holds an Ed25519 signing key for certificates and an X25519
//! key pair that every message key is escrowed to. Given any wire message it
//! can unwrap the message key from the header and read the payload, without
//! holding any ratchet state.

use warrant_crypto::{KeyPair, MessageKey, PublicKey, SIGNATURE_SIZE, SigningKeyPair, open_message};
use warrant_proto::{Certificate, CertificateForm, Header, WireMessage};

use crate::{
    config::{AuthorityKeys, ClientConfig},
    env::Environment,
    error::ClientError,
};

/// Certificate signer and escrow key holder.
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    signing_key: SigningKeyPair,
    escrow_key_pair: KeyPair,
}

impl CertificateAuthority {
    /// Generate fresh authority keys.
    pub fn generate(env: &impl Environment) -> Self {
        Self::from_secrets(env.random_array(), env.random_array())
    }

    /// Rebuild an authority from its Ed25519 seed and X25519 secret.
    pub fn from_secrets(signing_seed: [u8; 32], escrow_secret: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKeyPair::from_seed(&signing_seed),
            escrow_key_pair: KeyPair::from_secret_bytes(escrow_secret),
        }
    }

    /// Public keys clients must trust.
    pub fn keys(&self) -> AuthorityKeys {
        AuthorityKeys {
            verifying_key: self.signing_key.verifying_key().to_bytes(),
            escrow_public_key: self.escrow_key_pair.public_key().to_bytes(),
        }
    }

    /// Client configuration trusting this authority.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.keys())
    }

    /// Escrow public key.
    pub fn escrow_public_key(&self) -> PublicKey {
        self.escrow_key_pair.public_key()
    }

    /// Sign the canonical form of a certificate.
    pub fn sign(&self, form: &CertificateForm) -> Result<[u8; SIGNATURE_SIZE], ClientError> {
        let canonical = form
            .canonical()
            .map_err(|e| ClientError::MalformedCertificate { reason: e.to_string() })?;

        tracing::info!("signing certificate");
        Ok(self.signing_key.sign(canonical.as_bytes()))
    }

    /// Sign a structured certificate, returning it ready for distribution.
    pub fn certify(
        &self,
        certificate: Certificate,
    ) -> Result<(CertificateForm, [u8; SIGNATURE_SIZE]), ClientError> {
        let form = CertificateForm::from(certificate);
        let signature = self.sign(&form)?;
        Ok((form, signature))
    }

    /// Unwrap the message key escrowed in `header`.
    ///
    /// # Errors
    ///
    /// - `Escrow` if the wrapped key was altered or was not made for this
    ///   authority
    pub fn recover_message_key(&self, header: &Header) -> Result<MessageKey, ClientError> {
        let ephemeral_public = PublicKey::from_bytes(header.v_gov);
        Ok(warrant_crypto::recover_message_key(
            &self.escrow_key_pair,
            &ephemeral_public,
            &header.c_gov,
        )?)
    }

    /// Decrypt a message in transit using the escrowed key.
    ///
    /// Independent of any session: each message carries everything needed.
    pub fn decrypt_intercepted(&self, message: &WireMessage) -> Result<Vec<u8>, ClientError> {
        let message_key = self.recover_message_key(&message.header)?;
        let aad = message.header.canonical_bytes()?;

        Ok(open_message(&message_key, &message.ciphertext, &aad)?)
    }
}
