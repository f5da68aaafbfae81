//! Per-peer double-ratchet session.
//!
//! A session holds the root key, the sending and receiving chain keys, the
//! current ratchet key pair, and the peer's latest ratchet public key. It
//! evolves through two kinds of steps:
//!
//! - DH ratchet step: on a change of direction, a fresh DH output is mixed
//!   into the root key, replacing it and producing a new chain
//! - Chain step: once per message, the active chain is advanced and yields a
//!   single-use message key
//!
//! # Commit discipline
//!
//! Every operation is computed on a copy: [`RatchetSession::prepare_send`]
//! and [`RatchetSession::prepare_receive`] take `&self` and return the next
//! session together with the message key. The caller replaces the stored
//! session only after everything else that can fail (escrow, encoding,
//! decryption) has succeeded. A failed call therefore never leaves a session
//! that mixes old and new ratchet material.
//!
//! # Invariants
//!
//! - The root key is replaced, never combined, on every DH step
//! - A chain key that produced a message key is never used again
//! - `direction` is `Sending` iff the last DH step was self-initiated (or the
//!   session was initialized as sender)

use std::fmt;

use thiserror::Error;
use warrant_crypto::{
    ChainKey, KeyPair, MessageKey, PublicKey, RootKey, SECRET_KEY_SIZE, advance_chain, root_kdf,
};

/// Which way the session is currently ratcheted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Last DH step was self-initiated; sends use the current sending chain.
    Sending,
    /// Last DH step was triggered by the peer; the next send ratchets first.
    Receiving,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sending => f.write_str("sending"),
            Self::Receiving => f.write_str("receiving"),
        }
    }
}

/// Errors from session state transitions.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// A sender step needs the peer's ratchet key, and none is known yet
    #[error("no remote ratchet key: session has never received")]
    NoRemoteRatchetKey,

    /// The chain for this direction was never established
    #[error("no {direction} chain established")]
    MissingChain {
        /// Direction whose chain is missing
        direction: Direction,
    },
}

/// Ratchet state shared with one peer.
#[derive(Debug, Clone)]
pub struct RatchetSession {
    root_key: RootKey,
    sending_chain_key: Option<ChainKey>,
    receiving_chain_key: Option<ChainKey>,
    self_ratchet_key_pair: KeyPair,
    remote_ratchet_public_key: Option<PublicKey>,
    direction: Direction,
    /// DH ratchet steps performed since initialization.
    dh_steps: u64,
    /// Messages sent on the current sending chain.
    sent_count: u32,
    /// Messages received on the current receiving chain.
    received_count: u32,
}

impl RatchetSession {
    /// Initialize the side that sends first.
    ///
    /// `SK = DH(identity, peer)`, then a first ratchet key pair is created
    /// from `ephemeral_secret` and `(root, sending chain) = RootKDF(SK,
    /// DH(ephemeral, peer))`.
    pub fn init_as_sender(
        identity: &KeyPair,
        peer_public: &PublicKey,
        ephemeral_secret: [u8; SECRET_KEY_SIZE],
    ) -> Self {
        let shared = identity.diffie_hellman(peer_public);
        let ephemeral = KeyPair::from_secret_bytes(ephemeral_secret);
        let dh_out = ephemeral.diffie_hellman(peer_public);

        let (root_key, sending_chain_key) =
            root_kdf(&RootKey::from_shared_secret(&shared), &dh_out);

        Self {
            root_key,
            sending_chain_key: Some(sending_chain_key),
            receiving_chain_key: None,
            self_ratchet_key_pair: ephemeral,
            remote_ratchet_public_key: Some(*peer_public),
            direction: Direction::Sending,
            dh_steps: 0,
            sent_count: 0,
            received_count: 0,
        }
    }

    /// Initialize the side that receives first.
    ///
    /// The static `DH(identity, peer)` becomes the root key directly, and the
    /// identity key pair serves as the first ratchet key pair. The sender's
    /// first ratchet key completes the exchange on the first receive.
    pub fn init_as_receiver(identity: &KeyPair, peer_public: &PublicKey) -> Self {
        let shared = identity.diffie_hellman(peer_public);

        Self {
            root_key: RootKey::from_shared_secret(&shared),
            sending_chain_key: None,
            receiving_chain_key: None,
            self_ratchet_key_pair: identity.clone(),
            remote_ratchet_public_key: None,
            direction: Direction::Receiving,
            dh_steps: 0,
            sent_count: 0,
            received_count: 0,
        }
    }

    /// Current direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// DH ratchet steps performed since initialization.
    pub fn dh_steps(&self) -> u64 {
        self.dh_steps
    }

    /// Messages sent on the current sending chain.
    pub fn sent_count(&self) -> u32 {
        self.sent_count
    }

    /// Messages received on the current receiving chain.
    pub fn received_count(&self) -> u32 {
        self.received_count
    }

    /// Public key of the current ratchet key pair (goes into every header).
    pub fn self_public_key(&self) -> PublicKey {
        self.self_ratchet_key_pair.public_key()
    }

    /// Peer's latest ratchet public key, if one has been seen.
    pub fn remote_public_key(&self) -> Option<PublicKey> {
        self.remote_ratchet_public_key
    }

    /// Compute the state after sending one message.
    ///
    /// Performs a sender-triggered DH step first if the session is
    /// receiving; `ephemeral_secret` is only called in that case. Returns the
    /// next session and the message key for this message.
    pub fn prepare_send(
        &self,
        ephemeral_secret: impl FnOnce() -> [u8; SECRET_KEY_SIZE],
    ) -> Result<(Self, MessageKey), SessionError> {
        let mut next = match self.direction {
            Direction::Sending => self.clone(),
            Direction::Receiving => self.sender_step(ephemeral_secret())?,
        };

        let chain = next
            .sending_chain_key
            .as_ref()
            .ok_or(SessionError::MissingChain { direction: Direction::Sending })?;
        let (next_chain, message_key) = advance_chain(chain);

        next.sending_chain_key = Some(next_chain);
        next.sent_count = next.sent_count.saturating_add(1);

        Ok((next, message_key))
    }

    /// Compute the state after receiving one message whose header carries
    /// `remote` as the sender's ratchet key.
    ///
    /// Performs a receiver-triggered DH step first if `remote` differs from
    /// the stored remote key. Returns the next session and the message key
    /// the message must decrypt under.
    pub fn prepare_receive(&self, remote: &PublicKey) -> Result<(Self, MessageKey), SessionError> {
        let mut next = if self.remote_ratchet_public_key.as_ref() == Some(remote) {
            self.clone()
        } else {
            self.receiver_step(remote)
        };

        let chain = next
            .receiving_chain_key
            .as_ref()
            .ok_or(SessionError::MissingChain { direction: Direction::Receiving })?;
        let (next_chain, message_key) = advance_chain(chain);

        next.receiving_chain_key = Some(next_chain);
        next.received_count = next.received_count.saturating_add(1);

        Ok((next, message_key))
    }

    /// Sender-triggered DH step: new ratchet key pair, new sending chain.
    fn sender_step(&self, ephemeral_secret: [u8; SECRET_KEY_SIZE]) -> Result<Self, SessionError> {
        let remote = self.remote_ratchet_public_key.ok_or(SessionError::NoRemoteRatchetKey)?;

        let ephemeral = KeyPair::from_secret_bytes(ephemeral_secret);
        let dh_out = ephemeral.diffie_hellman(&remote);
        let (root_key, sending_chain_key) = root_kdf(&self.root_key, &dh_out);

        Ok(Self {
            root_key,
            sending_chain_key: Some(sending_chain_key),
            self_ratchet_key_pair: ephemeral,
            direction: Direction::Sending,
            dh_steps: self.dh_steps + 1,
            sent_count: 0,
            ..self.clone()
        })
    }

    /// Receiver-triggered DH step: adopt the new remote key, new receiving
    /// chain.
    fn receiver_step(&self, remote: &PublicKey) -> Self {
        let dh_out = self.self_ratchet_key_pair.diffie_hellman(remote);
        let (root_key, receiving_chain_key) = root_kdf(&self.root_key, &dh_out);

        Self {
            root_key,
            receiving_chain_key: Some(receiving_chain_key),
            remote_ratchet_public_key: Some(*remote),
            direction: Direction::Receiving,
            dh_steps: self.dh_steps + 1,
            received_count: 0,
            ..self.clone()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct Pair {
        alice: RatchetSession,
        bob: RatchetSession,
    }

    /// Alice initialized as sender toward Bob, Bob as receiver from Alice.
    fn pair() -> Pair {
        let alice_identity = KeyPair::from_secret_bytes([0xA1; 32]);
        let bob_identity = KeyPair::from_secret_bytes([0xB0; 32]);

        Pair {
            alice: RatchetSession::init_as_sender(
                &alice_identity,
                &bob_identity.public_key(),
                [0xA2; 32],
            ),
            bob: RatchetSession::init_as_receiver(&bob_identity, &alice_identity.public_key()),
        }
    }

    #[test]
    fn sender_init_state() {
        let Pair { alice, .. } = pair();

        assert_eq!(alice.direction(), Direction::Sending);
        assert_eq!(alice.dh_steps(), 0);
        assert_eq!(
            alice.remote_public_key(),
            Some(KeyPair::from_secret_bytes([0xB0; 32]).public_key())
        );
        assert_eq!(alice.self_public_key(), KeyPair::from_secret_bytes([0xA2; 32]).public_key());
    }

    #[test]
    fn receiver_init_state() {
        let Pair { bob, .. } = pair();

        assert_eq!(bob.direction(), Direction::Receiving);
        assert_eq!(bob.remote_public_key(), None);
        assert_eq!(bob.self_public_key(), KeyPair::from_secret_bytes([0xB0; 32]).public_key());
    }

    #[test]
    fn first_message_keys_agree() {
        let Pair { alice, bob } = pair();

        let (alice, send_key) = alice.prepare_send(|| unreachable!("no step needed")).unwrap();
        let (bob, recv_key) = bob.prepare_receive(&alice.self_public_key()).unwrap();

        assert_eq!(send_key.key(), recv_key.key());
        assert_eq!(bob.direction(), Direction::Receiving);
        assert_eq!(bob.dh_steps(), 1);
        assert_eq!(bob.received_count(), 1);
    }

    #[test]
    fn same_direction_sends_do_not_ratchet() {
        let Pair { alice, .. } = pair();

        let (alice, key1) = alice.prepare_send(|| unreachable!("no step needed")).unwrap();
        let (alice, key2) = alice.prepare_send(|| unreachable!("no step needed")).unwrap();

        assert_ne!(key1.key(), key2.key());
        assert_eq!(alice.dh_steps(), 0);
        assert_eq!(alice.sent_count(), 2);
    }

    #[test]
    fn reply_ratchets_exactly_once() {
        let Pair { alice, bob } = pair();

        let (alice, _) = alice.prepare_send(|| [0; 32]).unwrap();
        let (bob, bob_recv_key) = bob.prepare_receive(&alice.self_public_key()).unwrap();
        let steps_before_reply = bob.dh_steps();

        let (bob, reply_key) = bob.prepare_send(|| [0xB1; 32]).unwrap();

        assert_eq!(bob.dh_steps(), steps_before_reply + 1);
        assert_eq!(bob.direction(), Direction::Sending);
        assert_ne!(bob.self_public_key(), KeyPair::from_secret_bytes([0xB0; 32]).public_key());

        // The reply key must not come from the receiving chain
        let (_, stale_key) = bob.receiving_chain_key.as_ref().unwrap().advance();
        assert_ne!(reply_key.key(), stale_key.key());
        assert_ne!(reply_key.key(), bob_recv_key.key());

        let (alice, alice_recv_key) = alice.prepare_receive(&bob.self_public_key()).unwrap();
        assert_eq!(reply_key.key(), alice_recv_key.key());
        assert_eq!(alice.direction(), Direction::Receiving);
        assert_eq!(alice.dh_steps(), 1);
    }

    #[test]
    fn root_key_is_replaced_on_every_step() {
        let Pair { alice, bob } = pair();

        let (alice2, _) = alice.prepare_send(|| [0; 32]).unwrap();
        let (bob2, _) = bob.prepare_receive(&alice2.self_public_key()).unwrap();
        assert_ne!(bob2.root_key.as_bytes(), bob.root_key.as_bytes());

        let (bob3, _) = bob2.prepare_send(|| [0xB1; 32]).unwrap();
        assert_ne!(bob3.root_key.as_bytes(), bob2.root_key.as_bytes());
    }

    #[test]
    fn prepare_leaves_original_untouched() {
        let Pair { alice, .. } = pair();
        let before = *alice.sending_chain_key.as_ref().unwrap().as_bytes();

        let _ = alice.prepare_send(|| [0; 32]).unwrap();

        assert_eq!(alice.sending_chain_key.as_ref().unwrap().as_bytes(), &before);
        assert_eq!(alice.sent_count(), 0);
    }

    #[test]
    fn receiver_cannot_send_before_receiving() {
        let Pair { bob, .. } = pair();
        let result = bob.prepare_send(|| [0xB1; 32]);
        assert!(matches!(result, Err(SessionError::NoRemoteRatchetKey)));
    }

    #[test]
    fn receive_on_known_key_without_chain_fails() {
        let Pair { alice, .. } = pair();
        let bob_identity_public = alice.remote_public_key().unwrap();

        let result = alice.prepare_receive(&bob_identity_public);
        assert!(matches!(
            result,
            Err(SessionError::MissingChain { direction: Direction::Receiving })
        ));
    }

    #[test]
    fn late_message_on_previous_chain_still_decrypts() {
        // Alice sends twice; Bob receives the first, replies, then receives the second
        let Pair { alice, bob } = pair();

        let (alice, first) = alice.prepare_send(|| [0; 32]).unwrap();
        let (alice, second) = alice.prepare_send(|| [0; 32]).unwrap();

        let (bob, recv_first) = bob.prepare_receive(&alice.self_public_key()).unwrap();
        let (bob, _) = bob.prepare_send(|| [0xB1; 32]).unwrap();
        let (bob, recv_second) = bob.prepare_receive(&alice.self_public_key()).unwrap();

        assert_eq!(first.key(), recv_first.key());
        assert_eq!(second.key(), recv_second.key());
        assert_eq!(bob.direction(), Direction::Sending);
    }
}
