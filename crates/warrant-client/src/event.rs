//! Client events and actions.

use warrant_proto::{Certificate, CertificateForm, WireMessage};

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Carrying certificates and signatures between the authority and peers
/// - Delivering wire messages from the transport
/// - Forwarding application intents (send message, issue identity)
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Application wants a fresh identity under `identity`.
    ///
    /// Replaces any previous identity key pair. Existing sessions keep the
    /// keys they were created with.
    IssueCertificate {
        /// Identity label to bind.
        identity: String,
    },

    /// A peer certificate and the authority's signature over it arrived.
    AcceptCertificate {
        /// Certificate as received.
        certificate: CertificateForm,
        /// Ed25519 signature by the authority.
        signature: Vec<u8>,
    },

    /// Application wants to send a message.
    SendMessage {
        /// Recipient identity.
        peer: String,
        /// Message plaintext.
        plaintext: Vec<u8>,
    },

    /// Wire message received from a peer.
    MessageReceived {
        /// Sender identity.
        peer: String,
        /// Message as received.
        message: WireMessage,
    },
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone)]
pub enum ClientAction {
    /// Get this certificate signed by the authority and distribute it.
    PublishCertificate(Certificate),

    /// A peer certificate was verified and stored.
    CertificateAccepted {
        /// Identity of the peer.
        identity: String,
    },

    /// Deliver a wire message to a peer.
    Send {
        /// Recipient identity.
        peer: String,
        /// Encrypted message.
        message: WireMessage,
    },

    /// Deliver decrypted message to the application layer.
    DeliverMessage {
        /// Sender identity.
        peer: String,
        /// Decrypted plaintext.
        plaintext: Vec<u8>,
    },
}
