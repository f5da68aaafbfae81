//! Client error types.

use std::fmt;

use thiserror::Error;
use warrant_crypto::CryptoError;
use warrant_proto::ProtocolError;

use crate::session::Direction;

/// The client operation during which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Encrypting a message for a peer
    Send,
    /// Decrypting a message from a peer
    Receive,
    /// Accepting a peer certificate
    Accept,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Send => f.write_str("send"),
            Self::Receive => f.write_str("receive"),
            Self::Accept => f.write_str("accept"),
        }
    }
}

/// Errors surfaced by the client.
///
/// Every failure is terminal for the call that produced it and leaves the
/// client exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Certificate signature did not verify against the trusted authority
    #[error(
        "invalid certificate for {}: authority signature rejected",
        .identity.as_deref().unwrap_or("<unparsed>")
    )]
    InvalidCertificate {
        /// Identity label, when it could be read from the certificate
        identity: Option<String>,
    },

    /// Certificate could not be canonicalized or parsed
    #[error("malformed certificate: {reason}")]
    MalformedCertificate {
        /// What was wrong with it
        reason: String,
    },

    /// Authenticated decryption failed (tampering or desynchronized chain)
    #[error("authentication failed for message from {peer}")]
    AuthenticationFailure {
        /// Peer the message claimed to come from
        peer: String,
    },

    /// No certificate on file for the peer
    #[error("unknown peer {peer}: no certificate on file ({operation})")]
    UnknownPeer {
        /// Peer that was addressed
        peer: String,
        /// Operation that needed the certificate
        operation: Operation,
    },

    /// No identity key pair has been issued yet
    #[error("no identity: issue a certificate before {operation}")]
    NoIdentity {
        /// Operation that needed the identity
        operation: Operation,
    },

    /// Session has no remote ratchet key to ratchet against
    #[error("session with {peer} has no remote ratchet key")]
    NoRemoteRatchetKey {
        /// Peer of the session
        peer: String,
    },

    /// Session has no chain for the direction it was asked to use
    #[error("session with {peer} has no {direction} chain")]
    MissingChain {
        /// Peer of the session
        peer: String,
        /// Direction whose chain is missing
        direction: Direction,
    },

    /// Escrow material could not be produced or recovered
    #[error("escrow failure: {reason}")]
    Escrow {
        /// Underlying cause
        reason: String,
    },

    /// Wire encoding or decoding failed
    #[error("codec error: {reason}")]
    Codec {
        /// Underlying cause
        reason: String,
    },

    /// Client configuration is unusable
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What was wrong with it
        reason: String,
    },
}

impl ClientError {
    /// Returns true if this error is a cryptographic rejection.
    ///
    /// Cryptographic rejections indicate tampering, a forged certificate, or
    /// a desynchronized chain. Hosts must surface them and never retry them
    /// silently.
    pub fn is_cryptographic(&self) -> bool {
        matches!(
            self,
            Self::InvalidCertificate { .. }
                | Self::AuthenticationFailure { .. }
                | Self::Escrow { .. }
        )
    }
}

/// Crypto failures reach the client only from escrow material; payload
/// decryption failures are mapped to `AuthenticationFailure` at the call site.
impl From<CryptoError> for ClientError {
    fn from(err: CryptoError) -> Self {
        Self::Escrow { reason: err.to_string() }
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        Self::Codec { reason: err.to_string() }
    }
}
