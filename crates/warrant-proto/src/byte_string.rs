//! CBOR byte-string encoding for raw key material.
//!
//! Plain serde writes `[u8; N]` and `Vec<u8>` as sequences of integers. These
//! modules write a single byte string instead, and only accept a byte string
//! back, so a header has exactly one encoding.

use std::{fmt, marker::PhantomData};

use serde::{
    Deserializer, Serializer,
    de::{Error, Visitor},
};

/// Fixed-length arrays, for `#[serde(with = "byte_string::array")]`.
pub mod array {
    use super::{Deserializer, Error, PhantomData, Serializer, Visitor, fmt};

    struct ArrayVisitor<const N: usize>(PhantomData<[u8; N]>);

    impl<const N: usize> Visitor<'_> for ArrayVisitor<N> {
        type Value = [u8; N];

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "a byte string of length {N}")
        }

        fn visit_bytes<E: Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            v.try_into().map_err(|_| E::invalid_length(v.len(), &self))
        }
    }

    /// Serialize `[u8; N]` as one byte string.
    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    /// Deserialize `[u8; N]` from a byte string of exactly `N` bytes.
    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        deserializer.deserialize_bytes(ArrayVisitor::<N>(PhantomData))
    }
}

/// Variable-length buffers, for `#[serde(with = "byte_string::vec")]`.
pub mod vec {
    use super::{Deserializer, Error, Serializer, Visitor, fmt};

    struct VecVisitor;

    impl Visitor<'_> for VecVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a byte string")
        }

        fn visit_bytes<E: Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            Ok(v.to_vec())
        }

        fn visit_byte_buf<E: Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
            Ok(v)
        }
    }

    /// Serialize a buffer as one byte string.
    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    /// Deserialize a buffer from a byte string.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        deserializer.deserialize_byte_buf(VecVisitor)
    }
}
