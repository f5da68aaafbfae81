//! Property-based tests for the ratchet primitives
//!
//! These tests verify the invariants the session layer relies on:
//!
//! 1. **Round-trip**: open(seal(m)) == m for all messages and headers
//! 2. **Determinism**: root KDF and chain steps are pure functions
//! 3. **Key uniqueness**: successive chain steps never repeat a message key
//! 4. **Forward secrecy**: a later chain state never reproduces earlier keys
//! 5. **Escrow integrity**: the authority recovers exactly the wrapped key

use proptest::prelude::*;
use warrant_crypto::{
    ChainKey, KeyPair, MESSAGE_KEY_SIZE, MessageKey, NONCE_SIZE, RootKey, advance_chain,
    open_message, recover_message_key, root_kdf, seal_message, wrap_for_authority,
};

fn array32() -> impl Strategy<Value = [u8; 32]> {
    prop::collection::vec(any::<u8>(), 32..=32).prop_map(|v| {
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&v);
        arr
    })
}

fn array16() -> impl Strategy<Value = [u8; 16]> {
    prop::collection::vec(any::<u8>(), 16..=16).prop_map(|v| {
        let mut arr = [0u8; 16];
        arr.copy_from_slice(&v);
        arr
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_seal_open_roundtrip(
        plaintext in prop::collection::vec(any::<u8>(), 0..1000),
        aad in prop::collection::vec(any::<u8>(), 0..200),
        key in array16(),
        nonce_byte in any::<u8>(),
    ) {
        let message_key = MessageKey::from_bytes(key);
        let sealed = seal_message(&message_key, &plaintext, &aad, [nonce_byte; NONCE_SIZE]);
        let opened = open_message(&message_key, &sealed, &aad).unwrap();

        prop_assert_eq!(opened, plaintext);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_root_kdf_deterministic(
        root in array32(),
        left in array32(),
        right in array32(),
    ) {
        let dh = KeyPair::from_secret_bytes(left)
            .diffie_hellman(&KeyPair::from_secret_bytes(right).public_key());

        let (root1, chain1) = root_kdf(&RootKey::from_bytes(root), &dh);
        let (root2, chain2) = root_kdf(&RootKey::from_bytes(root), &dh);

        prop_assert_eq!(root1.as_bytes(), root2.as_bytes());
        prop_assert_eq!(chain1.as_bytes(), chain2.as_bytes());
    }

    #[test]
    fn prop_chain_step_deterministic(seed in array32()) {
        let (next1, msg1) = advance_chain(&ChainKey::from_bytes(seed));
        let (next2, msg2) = advance_chain(&ChainKey::from_bytes(seed));

        prop_assert_eq!(next1.as_bytes(), next2.as_bytes());
        prop_assert_eq!(msg1.key(), msg2.key());
    }

    #[test]
    fn prop_chain_keys_unique(seed in array32(), steps in 2usize..32) {
        let mut chain = ChainKey::from_bytes(seed);
        let mut keys: Vec<[u8; MESSAGE_KEY_SIZE]> = Vec::with_capacity(steps);

        for _ in 0..steps {
            let (next, message) = advance_chain(&chain);
            keys.push(*message.key());
            chain = next;
        }

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                prop_assert_ne!(keys[i], keys[j], "steps {} and {} reused a key", i, j);
            }
        }
    }

    #[test]
    fn prop_later_chain_never_reproduces_earlier_keys(
        seed in array32(),
        compromised_at in 1usize..16,
        lookahead in 1usize..32,
    ) {
        let mut chain = ChainKey::from_bytes(seed);
        let mut earlier: Vec<[u8; MESSAGE_KEY_SIZE]> = Vec::new();

        for _ in 0..compromised_at {
            let (next, message) = advance_chain(&chain);
            earlier.push(*message.key());
            chain = next;
        }

        // Everything an attacker can derive forward from the compromised state
        for _ in 0..lookahead {
            let (next, message) = advance_chain(&chain);
            prop_assert!(!earlier.contains(message.key()));
            chain = next;
        }
    }

    #[test]
    fn prop_escrow_recovers_wrapped_key(
        authority_secret in array32(),
        ephemeral_secret in array32(),
        key in array16(),
    ) {
        let authority = KeyPair::from_secret_bytes(authority_secret);
        let message_key = MessageKey::from_bytes(key);

        let escrowed = wrap_for_authority(
            &authority.public_key(),
            &message_key,
            ephemeral_secret,
            [0x11; NONCE_SIZE],
        );
        let recovered =
            recover_message_key(&authority, &escrowed.ephemeral_public, &escrowed.wrapped_key)
                .unwrap();

        prop_assert_eq!(recovered.key(), message_key.key());
    }
}
