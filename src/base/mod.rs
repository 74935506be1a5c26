//! Basic DNS data.
//!
//! This module only carries the IANA registries the key handling code
//! needs.

pub mod iana;
