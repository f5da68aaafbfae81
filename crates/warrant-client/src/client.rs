//! Client state machine.
//!
//! The `Client` owns one identity, the certificates of known peers, and one
//! ratchet session per peer. Sessions are created lazily: as sender the
//! first time a peer is messaged, as receiver the first time a peer's
//! message arrives.
//!
//! # Commit discipline
//!
//! Send and receive compute the next session on a copy and store it only
//! after every fallible step has succeeded. A failed call leaves the session
//! table exactly as it was, including not creating a session that was
//! lazily initialized for the call.

use std::collections::HashMap;

use warrant_crypto::{
    KeyPair, PublicKey, VerifyingKey, open_message, seal_message, wrap_for_authority,
};
use warrant_proto::{Certificate, CertificateForm, Header, WireMessage};

use crate::{
    certificates::CertificateStore,
    config::ClientConfig,
    env::Environment,
    error::{ClientError, Operation},
    event::{ClientAction, ClientEvent},
    session::{Direction, RatchetSession, SessionError},
};

/// Identity key pair and the label it was issued under.
struct Identity {
    label: String,
    key_pair: KeyPair,
}

/// Escrowed double-ratchet messaging client.
pub struct Client<E: Environment> {
    /// Environment for randomness.
    env: E,

    /// Authority key that must have signed every accepted certificate.
    authority: VerifyingKey,

    /// Authority key every message key is escrowed to.
    escrow_public_key: PublicKey,

    /// Absent until [`Client::issue`] runs.
    identity: Option<Identity>,

    /// Accepted peer certificates.
    certificates: CertificateStore,

    /// Ratchet session per peer identity.
    sessions: HashMap<String, RatchetSession>,
}

impl<E: Environment> Client<E> {
    /// Create a client trusting the authority named in `config`.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the authority verifying key is not a valid
    ///   Ed25519 key
    pub fn new(env: E, config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            env,
            authority: config.authority.verifying_key()?,
            escrow_public_key: config.authority.escrow_public_key(),
            identity: None,
            certificates: CertificateStore::new(),
            sessions: HashMap::new(),
        })
    }

    /// Generate a fresh identity key pair and the certificate binding it to
    /// `label`.
    ///
    /// Replaces any previous identity. The certificate still has to be
    /// signed by the authority before peers will accept it.
    pub fn issue(&mut self, label: impl Into<String>) -> Certificate {
        let label = label.into();
        let key_pair = KeyPair::from_secret_bytes(self.env.random_array());
        let certificate = Certificate::new(label.clone(), key_pair.public_key().to_bytes());

        let fingerprint = key_pair.public_key().fingerprint();
        if self.identity.is_some() {
            tracing::info!(identity = %label, key = %fingerprint, "replaced identity");
        } else {
            tracing::info!(identity = %label, key = %fingerprint, "issued identity");
        }

        self.identity = Some(Identity { label, key_pair });
        certificate
    }

    /// Verify a peer certificate against the authority and store it.
    ///
    /// Re-accepting a certificate for a known peer replaces the stored
    /// certificate; an existing session with that peer is kept.
    pub fn accept(
        &mut self,
        certificate: &CertificateForm,
        signature: &[u8],
    ) -> Result<Certificate, ClientError> {
        self.certificates.accept(&self.authority, certificate, signature)
    }

    /// Encrypt `plaintext` for `peer`.
    ///
    /// # Errors
    ///
    /// - `NoIdentity` if [`Client::issue`] has not run
    /// - `UnknownPeer` if no certificate for `peer` has been accepted
    /// - `Codec` if the header cannot be encoded
    pub fn send(&mut self, peer: &str, plaintext: &[u8]) -> Result<WireMessage, ClientError> {
        let identity = self.identity(Operation::Send)?;
        let peer_public = self.peer_public_key(peer, Operation::Send)?;

        let created = !self.sessions.contains_key(peer);
        let current = match self.sessions.get(peer) {
            Some(session) => session.clone(),
            None => RatchetSession::init_as_sender(
                &identity.key_pair,
                &peer_public,
                self.env.random_array(),
            ),
        };

        let (next, message_key) = current
            .prepare_send(|| self.env.random_array())
            .map_err(|e| session_error(peer, e))?;

        let escrowed = wrap_for_authority(
            &self.escrow_public_key,
            &message_key,
            self.env.random_array(),
            self.env.random_array(),
        );

        let header = Header {
            pub_key: next.self_public_key().to_bytes(),
            v_gov: escrowed.ephemeral_public.to_bytes(),
            c_gov: escrowed.wrapped_key,
        };
        let aad = header.canonical_bytes()?;
        let ciphertext = seal_message(&message_key, plaintext, &aad, self.env.random_array());

        log_transition(peer, created, &current, &next);
        self.sessions.insert(peer.to_owned(), next);

        Ok(WireMessage { header, ciphertext })
    }

    /// Decrypt a message from `peer`.
    ///
    /// # Errors
    ///
    /// - `NoIdentity` if [`Client::issue`] has not run
    /// - `UnknownPeer` if no certificate for `peer` has been accepted
    /// - `AuthenticationFailure` if the header or payload was altered, or the
    ///   receiving chain is out of step with the sender
    pub fn receive(&mut self, peer: &str, message: &WireMessage) -> Result<Vec<u8>, ClientError> {
        let identity = self.identity(Operation::Receive)?;
        let peer_public = self.peer_public_key(peer, Operation::Receive)?;

        let created = !self.sessions.contains_key(peer);
        let current = match self.sessions.get(peer) {
            Some(session) => session.clone(),
            None => RatchetSession::init_as_receiver(&identity.key_pair, &peer_public),
        };

        let remote = PublicKey::from_bytes(message.header.pub_key);
        let (next, message_key) = current
            .prepare_receive(&remote)
            .map_err(|e| session_error(peer, e))?;

        let aad = message.header.canonical_bytes()?;
        let plaintext = open_message(&message_key, &message.ciphertext, &aad).map_err(|e| {
            tracing::warn!(peer, error = %e, "rejected message");
            ClientError::AuthenticationFailure { peer: peer.to_owned() }
        })?;

        log_transition(peer, created, &current, &next);
        self.sessions.insert(peer.to_owned(), next);

        Ok(plaintext)
    }

    /// Decode transport bytes and decrypt them as a message from `peer`.
    pub fn receive_bytes(&mut self, peer: &str, bytes: &[u8]) -> Result<Vec<u8>, ClientError> {
        let message = WireMessage::decode(bytes)?;
        self.receive(peer, &message)
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::IssueCertificate { identity } => {
                Ok(vec![ClientAction::PublishCertificate(self.issue(identity))])
            },
            ClientEvent::AcceptCertificate { certificate, signature } => {
                let accepted = self.accept(&certificate, &signature)?;
                Ok(vec![ClientAction::CertificateAccepted { identity: accepted.identity }])
            },
            ClientEvent::SendMessage { peer, plaintext } => {
                let message = self.send(&peer, &plaintext)?;
                Ok(vec![ClientAction::Send { peer, message }])
            },
            ClientEvent::MessageReceived { peer, message } => {
                let plaintext = self.receive(&peer, &message)?;
                Ok(vec![ClientAction::DeliverMessage { peer, plaintext }])
            },
        }
    }

    /// Label of the current identity, if issued.
    pub fn identity_label(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.label.as_str())
    }

    /// Public key of the current identity, if issued.
    pub fn identity_public_key(&self) -> Option<PublicKey> {
        self.identity.as_ref().map(|identity| identity.key_pair.public_key())
    }

    /// Accepted certificate for `peer`.
    pub fn peer_certificate(&self, peer: &str) -> Option<&Certificate> {
        self.certificates.get(peer)
    }

    /// Check if a session with `peer` exists.
    pub fn has_session(&self, peer: &str) -> bool {
        self.sessions.contains_key(peer)
    }

    /// Session with `peer`, for inspection.
    pub fn session(&self, peer: &str) -> Option<&RatchetSession> {
        self.sessions.get(peer)
    }

    /// Number of peers with a session.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn identity(&self, operation: Operation) -> Result<&Identity, ClientError> {
        self.identity.as_ref().ok_or(ClientError::NoIdentity { operation })
    }

    fn peer_public_key(&self, peer: &str, operation: Operation) -> Result<PublicKey, ClientError> {
        self.certificates
            .public_key(peer)
            .ok_or_else(|| ClientError::UnknownPeer { peer: peer.to_owned(), operation })
    }
}

/// Map a session error to the client taxonomy.
///
/// A missing receiving chain can only be hit by a header that reuses a key
/// the peer never sent from, so it is reported as an authentication failure.
fn session_error(peer: &str, err: SessionError) -> ClientError {
    match err {
        SessionError::NoRemoteRatchetKey => {
            ClientError::NoRemoteRatchetKey { peer: peer.to_owned() }
        },
        SessionError::MissingChain { direction: Direction::Receiving } => {
            tracing::warn!(peer, error = %err, "rejected message");
            ClientError::AuthenticationFailure { peer: peer.to_owned() }
        },
        SessionError::MissingChain { direction } => {
            tracing::warn!(peer, error = %err, "session has no chain to send on");
            ClientError::MissingChain { peer: peer.to_owned(), direction }
        },
    }
}

fn log_transition(peer: &str, created: bool, before: &RatchetSession, after: &RatchetSession) {
    if created {
        tracing::debug!(peer, direction = %before.direction(), "created session");
    }
    if after.dh_steps() != before.dh_steps() {
        tracing::debug!(
            peer,
            direction = %after.direction(),
            dh_steps = after.dh_steps(),
            ratchet_key = %after.self_public_key().fingerprint(),
            "dh ratchet step"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{CertificateAuthority, SeededEnv};

    fn client(authority: &CertificateAuthority, seed: u64) -> Client<SeededEnv> {
        Client::new(SeededEnv::new(seed), &authority.config()).unwrap()
    }

    #[test]
    fn send_without_identity_fails() {
        let authority = CertificateAuthority::from_secrets([1; 32], [2; 32]);
        let mut alice = client(&authority, 1);

        let result = alice.send("bob", b"hi");

        assert_eq!(result.unwrap_err(), ClientError::NoIdentity { operation: Operation::Send });
    }

    #[test]
    fn send_to_unknown_peer_fails() {
        let authority = CertificateAuthority::from_secrets([1; 32], [2; 32]);
        let mut alice = client(&authority, 1);
        alice.issue("alice");

        let result = alice.send("bob", b"hi");

        assert_eq!(
            result.unwrap_err(),
            ClientError::UnknownPeer { peer: "bob".into(), operation: Operation::Send }
        );
        assert!(!alice.has_session("bob"));
    }

    #[test]
    fn first_send_creates_sender_session() {
        let authority = CertificateAuthority::from_secrets([1; 32], [2; 32]);
        let mut alice = client(&authority, 1);
        let mut bob = client(&authority, 2);
        alice.issue("alice");
        let (form, signature) = authority.certify(bob.issue("bob")).unwrap();
        alice.accept(&form, &signature).unwrap();

        let message = alice.send("bob", b"hi").unwrap();
        let session = alice.session("bob").unwrap();

        assert_eq!(session.direction(), Direction::Sending);
        assert_eq!(session.sent_count(), 1);
        assert_eq!(alice.session_count(), 1);
        assert_eq!(message.header.pub_key, session.self_public_key().to_bytes());
    }

    #[test]
    fn reissue_replaces_identity() {
        let authority = CertificateAuthority::from_secrets([1; 32], [2; 32]);
        let mut alice = client(&authority, 1);

        let first = alice.issue("alice");
        let second = alice.issue("alice");

        assert_ne!(first.public_key, second.public_key);
        assert_eq!(alice.identity_public_key().unwrap().to_bytes(), second.public_key);
        assert_eq!(alice.identity_label(), Some("alice"));
    }

    #[test]
    fn handle_maps_events_to_actions() {
        let authority = CertificateAuthority::from_secrets([1; 32], [2; 32]);
        let mut alice = client(&authority, 1);

        let actions =
            alice.handle(ClientEvent::IssueCertificate { identity: "alice".into() }).unwrap();

        assert!(matches!(
            actions.as_slice(),
            [ClientAction::PublishCertificate(certificate)] if certificate.identity == "alice"
        ));
    }

    #[test]
    fn session_errors_keep_their_meaning() {
        assert_eq!(
            session_error("bob", SessionError::NoRemoteRatchetKey),
            ClientError::NoRemoteRatchetKey { peer: "bob".into() }
        );
        assert_eq!(
            session_error("bob", SessionError::MissingChain { direction: Direction::Receiving }),
            ClientError::AuthenticationFailure { peer: "bob".into() }
        );
        assert_eq!(
            session_error("bob", SessionError::MissingChain { direction: Direction::Sending }),
            ClientError::MissingChain { peer: "bob".into(), direction: Direction::Sending }
        );
    }
}
