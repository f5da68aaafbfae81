//! Client
//!
//! Escrowed double-ratchet messaging client. Owns one identity key pair, the
//! certificates of known peers, and one ratchet session per peer.
//!
//! # Architecture
//!
//! The client is Sans-IO: it never touches the network or disk. Hosts call
//! [`Client::send`] / [`Client::receive`] directly, or feed [`ClientEvent`]s
//! through [`Client::handle`] and execute the returned [`ClientAction`]s.
//! All randomness comes from an [`Environment`], so a seeded environment
//! makes every key and nonce reproducible in tests.
//!
//! # Components
//!
//! - [`Client`]: identity, certificate table, session table, send/receive
//! - [`RatchetSession`]: per-peer root key, chains and DH ratchet state
//! - [`CertificateStore`]: authority-verified peer certificates
//! - [`CertificateAuthority`]: the escrow authority's side (signing,
//!   recovering message keys)
//!
//! # Limitations
//!
//! Messages must be received in the order they were sent. There is no
//! skipped-message-key cache: a dropped or reordered message desynchronizes
//! the receiving chain for the rest of that chain segment, and every later
//! message in it fails with [`ClientError::AuthenticationFailure`].
//!
//! The client is single-threaded. `&mut self` on every mutating call gives
//! one writer per client; hosts sharing a client across threads must hold a
//! lock across each whole send or receive.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod authority;
mod certificates;
mod client;
mod config;
pub mod env;
mod error;
mod event;
mod session;

pub use authority::CertificateAuthority;
pub use certificates::CertificateStore;
pub use client::Client;
pub use config::{AuthorityKeys, ClientConfig};
pub use env::{Environment, SeededEnv, SystemEnv};
pub use error::{ClientError, Operation};
pub use event::{ClientAction, ClientEvent};
pub use session::{Direction, RatchetSession, SessionError};
pub use warrant_proto::{Certificate, CertificateForm, Header, WireMessage};
