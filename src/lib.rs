//! DNSSEC key management.
//!
//! This crate provides the key handling core of a DNSSEC signer: it stores
//! private keys, turns public keys into DNSKEY records, and converts the
//! signatures produced by the cryptographic backend into the format used
//! in RRSIG records.
//!
//! # Modules
//!
//! * [base] contains the IANA registries for DNSSEC algorithms and digest
//!   types,
//! * [rdata] contains the DNSKEY and DS record data types,
//! * [crypto] contains the DER signature codec, the DNSKEY public key codec,
//!   and the [ring](https://github.com/briansmith/ring) based signing
//!   backend,
//! * [keystore] contains the keystore life cycle and its backends,
//! * [key] binds keys in a keystore to DNSKEY records, and
//! * [policy] describes how keys and signatures should be created.
//!
//! All fallible operations return the [`Error`] type from [error].
//!
//! # Example
//!
//! ```
//! use dnssec_keystore::base::iana::SecurityAlgorithm;
//! use dnssec_keystore::key::KeyHandle;
//! use dnssec_keystore::keystore::{memory::MemoryKeystore, Keystore};
//! use dnssec_keystore::rdata::Dnskey;
//!
//! let mut store = Keystore::new(MemoryKeystore::new());
//! store.open("")?;
//! let id = store.generate_key(SecurityAlgorithm::ECDSAP256SHA256, 256)?;
//! let key = KeyHandle::load(
//!     &store, &id, SecurityAlgorithm::ECDSAP256SHA256, Dnskey::KSK_FLAGS
//! )?;
//! println!("{}", key.dnskey()?);
//! let signature = key.sign(b"some data")?;
//! assert_eq!(signature.len(), 64);
//! # Ok::<(), dnssec_keystore::error::Error>(())
//! ```
//!
//! # Reference of Feature Flags
//!
//! * `logging`: Provides [`logging::init_logging`] to install a
//!   [tracing-subscriber](https://github.com/tokio-rs/tracing) based
//!   subscriber for the events reported by this crate.
//! * `serde`: Enables serde serialization for the IANA types and
//!   [`policy::KeyPolicy`].

#![allow(renamed_and_removed_lints)]
#![allow(clippy::unknown_clippy_lints)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod crypto;
pub mod error;
pub mod key;
pub mod keystore;
pub mod policy;
pub mod rdata;
pub mod utils;

#[cfg(any(test, feature = "logging"))]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

pub use self::error::Error;
