//! Resource data implementations.
//!
//! Only the record types needed to publish DNSSEC keys are implemented. The
//! types are named identically to the record type they implement.

pub mod dnssec;

pub use self::dnssec::{Dnskey, Ds};
