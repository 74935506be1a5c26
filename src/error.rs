//! Errors of key storage and signature encoding.
//!
//! All fallible operations of this crate return [`Error`]. Callers that only
//! care about the broad category of a failure can match on
//! [`Error::kind`] instead of the individual variants.
use core::fmt;
use std::string::String;

use crate::base::iana::SecurityAlgorithm;
use crate::keystore::State;

//------------ Error ---------------------------------------------------------

/// An error happened while handling keys or signatures.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The caller supplied an unusable argument.
    InvalidArgument(&'static str),

    /// The algorithm is unknown or not supported by the backend.
    UnsupportedAlgorithm(SecurityAlgorithm),

    /// The requested key size for the given algorithm is not supported.
    InvalidKeySize {
        algorithm: SecurityAlgorithm,
        min: u32,
        max: u32,
        requested: u32,
    },

    /// DER, RDATA, or PEM data was structurally invalid.
    MalformedEncoding(&'static str),

    /// The underlying crypto or storage operation failed.
    BackendFailure(String),

    /// The backend has no key with the given id.
    KeyNotFound(String),

    /// The keystore is not in the state the operation requires.
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,

        /// The state the keystore was in.
        state: State,
    },

    /// The key already has a private key bound to it.
    AlreadyBound,

    /// An output buffer could not be allocated.
    OutOfMemory,

    /// The operation is not implemented.
    NotImplemented,
}

impl Error {
    /// Returns the category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Error::InvalidKeySize { .. } => ErrorKind::InvalidKeySize,
            Error::MalformedEncoding(_) => ErrorKind::MalformedEncoding,
            Error::BackendFailure(_) | Error::KeyNotFound(_) => {
                ErrorKind::BackendFailure
            }
            Error::InvalidState { .. } => ErrorKind::InvalidState,
            Error::AlreadyBound => ErrorKind::AlreadyBound,
            Error::OutOfMemory => ErrorKind::OutOfMemory,
            Error::NotImplemented => ErrorKind::NotImplemented,
        }
    }
}

//--- From

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::BackendFailure(err.to_string())
    }
}

impl From<ring::error::Unspecified> for Error {
    fn from(_: ring::error::Unspecified) -> Self {
        Error::BackendFailure("cryptographic operation failed".into())
    }
}

impl From<octseq::parse::ShortInput> for Error {
    fn from(_: octseq::parse::ShortInput) -> Self {
        Error::MalformedEncoding("unexpected end of input")
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(_: std::collections::TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

//--- Display, Error

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => {
                write!(f, "invalid argument: {msg}")
            }
            Error::UnsupportedAlgorithm(algorithm) => {
                write!(f, "algorithm {algorithm} not supported")
            }
            Error::InvalidKeySize {
                algorithm,
                min,
                max,
                requested,
            } => {
                write!(f, "key size {requested} for algorithm {algorithm} must be in the range {min}..={max}")
            }
            Error::MalformedEncoding(msg) => {
                write!(f, "malformed data: {msg}")
            }
            Error::BackendFailure(msg) => {
                write!(f, "backend failure: {msg}")
            }
            Error::KeyNotFound(id) => write!(f, "no such key: {id}"),
            Error::InvalidState { operation, state } => {
                write!(f, "cannot {operation} a keystore that is {state}")
            }
            Error::AlreadyBound => {
                f.write_str("key already has a private key")
            }
            Error::OutOfMemory => f.write_str("out of memory"),
            Error::NotImplemented => f.write_str("not implemented"),
        }
    }
}

impl std::error::Error for Error {}

//------------ ErrorKind -----------------------------------------------------

/// The category of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    UnsupportedAlgorithm,
    InvalidKeySize,
    MalformedEncoding,
    BackendFailure,
    InvalidState,
    AlreadyBound,
    OutOfMemory,
    NotImplemented,
}
