//! Warrant wire types
//!
//! Types that cross the boundary between two clients or between a client and
//! the escrow authority: message headers, wire messages, and certificates.
//!
//! # Encodings
//!
//! - Headers and wire messages are CBOR. The header's CBOR encoding is also
//!   the associated data of the payload encryption, so field order is fixed
//!   by the struct definition and must never change. Key fields are CBOR
//!   byte strings.
//! - Certificates are deterministic JSON, the form the authority signs.
//!
//! This crate only moves bytes. Keys are carried as raw arrays; the client
//! converts them into `warrant_crypto` types.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod byte_string;
pub mod certificate;
mod error;
pub mod header;
pub mod hex_key;

pub use certificate::{Certificate, CertificateForm};
pub use error::{ProtocolError, Result};
pub use header::{Header, MAX_WIRE_SIZE, WireMessage};
