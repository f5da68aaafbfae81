//! Fuzz target for the receive pipeline
//!
//! Feeds adversarial transport bytes to a client that has an established
//! session with the claimed sender.
//!
//! # Strategy
//!
//! - Raw arbitrary bytes through `receive_bytes`
//! - Genuine messages with mutated header fields and ciphertext
//! - Valid messages replayed after the mutated ones
//!
//! # Invariants
//!
//! - Receive never panics
//! - A rejected message leaves the session untouched
//! - A genuine message still decrypts after any number of rejected ones

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use warrant_client::{CertificateAuthority, Client, SeededEnv, WireMessage};

#[derive(Debug, Clone, Arbitrary)]
struct ReceiveScenario {
    /// Seed for all client randomness
    seed: u64,
    /// Attacks delivered before the genuine message
    attacks: Vec<Attack>,
}

#[derive(Debug, Clone, Arbitrary)]
enum Attack {
    /// Raw bytes straight into the decoder
    RawBytes(Vec<u8>),
    /// Genuine message with one ratchet key byte replaced
    RatchetKey { index: u8, value: u8 },
    /// Genuine message with one escrow ephemeral byte replaced
    EscrowKey { index: u8, value: u8 },
    /// Genuine message with a replaced wrapped key
    WrappedKey(Vec<u8>),
    /// Genuine message with a ciphertext byte flipped
    FlipCiphertext { index: u16, mask: u8 },
    /// Genuine message with the ciphertext truncated
    Truncate { len: u16 },
}

fn apply(attack: &Attack, genuine: &WireMessage) -> Option<Vec<u8>> {
    let mut message = genuine.clone();
    match attack {
        Attack::RawBytes(bytes) => return Some(bytes.clone()),
        Attack::RatchetKey { index, value } => {
            message.header.pub_key[usize::from(*index) % 32] = *value;
        },
        Attack::EscrowKey { index, value } => {
            message.header.v_gov[usize::from(*index) % 32] = *value;
        },
        Attack::WrappedKey(bytes) => message.header.c_gov = bytes.clone(),
        Attack::FlipCiphertext { index, mask } => {
            let len = message.ciphertext.len();
            message.ciphertext[usize::from(*index) % len] ^= mask | 1;
        },
        Attack::Truncate { len } => {
            message.ciphertext.truncate(usize::from(*len) % message.ciphertext.len());
        },
    }
    (message != *genuine).then(|| message.encode().expect("encode"))
}

fuzz_target!(|scenario: ReceiveScenario| {
    let env = SeededEnv::new(scenario.seed);
    let authority = CertificateAuthority::generate(&env);

    let mut alice = Client::new(env.clone(), &authority.config()).expect("config");
    let mut bob = Client::new(env, &authority.config()).expect("config");
    let (alice_cert, alice_sig) = authority.certify(alice.issue("alice")).expect("certify");
    let (bob_cert, bob_sig) = authority.certify(bob.issue("bob")).expect("certify");
    alice.accept(&bob_cert, &bob_sig).expect("accept");
    bob.accept(&alice_cert, &alice_sig).expect("accept");

    let opening = alice.send("bob", b"opening").expect("send");
    bob.receive("alice", &opening).expect("receive");

    let genuine = alice.send("bob", b"genuine").expect("send");
    let received_before = bob.session("alice").expect("session").received_count();
    let steps_before = bob.session("alice").expect("session").dh_steps();

    for attack in &scenario.attacks {
        let Some(bytes) = apply(attack, &genuine) else {
            continue;
        };
        // Raw bytes may happen to encode the genuine message
        if WireMessage::decode(&bytes).is_ok_and(|decoded| decoded == genuine) {
            continue;
        }

        assert!(bob.receive_bytes("alice", &bytes).is_err(), "forged message accepted");

        let session = bob.session("alice").expect("session");
        assert_eq!(session.received_count(), received_before);
        assert_eq!(session.dh_steps(), steps_before);
    }

    let plaintext = bob.receive("alice", &genuine).expect("genuine message rejected");
    assert_eq!(plaintext, b"genuine");
});
