//! IANA Definitions for DNSSEC.
//!
//! This module contains types for parameters defined in IANA registries
//! that are relevant for this crate.
//!
//! All types defined hereunder follow the same basic structure. They are
//! newtypes around the raw integer with associated constants for all
//! well-defined values. Since we cannot restrict that integer to only the
//! well-defined values, we generally allow the full set of possible values.
//!
//! There are two methods `from_int()` and `to_int()` to convert from and
//! to raw integer values as well as implementations of the `From` trait
//! for these. `FromStr` and `Display` are implemented to convert from
//! the mnemonics to the values and back.

pub use self::digestalg::DigestAlgorithm;
pub use self::secalg::SecurityAlgorithm;

#[macro_use]
mod macros;

pub mod digestalg;
pub mod secalg;
