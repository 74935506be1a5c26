//! Cryptographic building blocks for DNSSEC keys.
//!
//! The module is split into the pieces that don't care about any particular
//! cryptographic library and the [`ring`] backend that performs the actual
//! operations:
//!
//! * [`common`] maps algorithms to their key family and key size policy,
//! * [`der`] converts between DER encoded ECDSA signatures and the fixed
//!   width format used in RRSIG records,
//! * [`dnskey`] converts public keys to and from DNSKEY record data, and
//! * [`ring`] generates keys, signs data, and verifies signatures.

pub mod common;
pub mod der;
pub mod dnskey;
pub mod ring;

pub use self::common::{DigestType, KeyFamily};
pub use self::dnskey::PublicKey;
pub use self::ring::SecretKey;
