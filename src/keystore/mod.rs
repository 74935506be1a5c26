//! Private key storage.
//!
//! A [`Keystore`] wraps a storage [`Backend`] and enforces the life cycle
//! every backend goes through:
//!
//! ```text
//! Constructed --init--> Initialized --open--> Open <--close/open--> Closed
//! ```
//!
//! The backend is only asked to list, generate, import, remove, or hand out
//! keys while the keystore is open. Requests in any other state fail with
//! [`Error::InvalidState`] without reaching the backend. Arguments are
//! validated before the backend is called, too, so a backend only ever sees
//! an algorithm and key size it can work with.
//!
//! Dropping a keystore closes it.
//!
//! Two backends are provided: [`pem::PemKeystore`] stores every key as a
//! PKCS#8 PEM file in a directory and [`memory::MemoryKeystore`] keeps keys
//! in memory only.

use core::fmt;
use std::string::String;
use std::vec::Vec;

use tracing::{debug, error, info, warn};

use crate::base::iana::SecurityAlgorithm;
use crate::crypto::common::check_key_size;
use crate::crypto::dnskey;
use crate::crypto::ring::{self, SecretKey};
use crate::error::Error;
use crate::key::key_id;

pub mod memory;
pub mod pem;

//----------- Backend --------------------------------------------------------

/// A storage backend for private keys.
///
/// Keys are identified by their key id, see [`key_id`]. The methods are only
/// called by [`Keystore`] which takes care of the state checks and of
/// validating the algorithm and key size for [`generate_key`].
///
/// [`generate_key`]: Backend::generate_key
pub trait Backend {
    /// Prepares persistent state for the backend.
    ///
    /// The meaning of `config` is up to the backend.
    fn init(&mut self, config: &str) -> Result<(), Error>;

    /// Opens a session with the backend.
    fn open(&mut self, config: &str) -> Result<(), Error>;

    /// Closes the session.
    fn close(&mut self) -> Result<(), Error>;

    /// Returns the ids of all stored keys.
    fn list_keys(&self) -> Result<Vec<String>, Error>;

    /// Generates and stores a new key, returning its id.
    ///
    /// `bits` has already been checked against the key size policy for the
    /// algorithm.
    fn generate_key(
        &mut self,
        algorithm: SecurityAlgorithm,
        bits: u32,
    ) -> Result<String, Error>;

    /// Stores the private key from a PEM document, returning its id.
    fn import_key(&mut self, pem: &[u8]) -> Result<String, Error>;

    /// Removes a stored key.
    ///
    /// Fails with [`Error::KeyNotFound`] if there is no such key.
    fn remove_key(&mut self, id: &str) -> Result<(), Error>;

    /// Loads a stored key ready for signing.
    fn get_private(&self, id: &str) -> Result<SecretKey, Error>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn init(&mut self, config: &str) -> Result<(), Error> {
        (**self).init(config)
    }

    fn open(&mut self, config: &str) -> Result<(), Error> {
        (**self).open(config)
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }

    fn list_keys(&self) -> Result<Vec<String>, Error> {
        (**self).list_keys()
    }

    fn generate_key(
        &mut self,
        algorithm: SecurityAlgorithm,
        bits: u32,
    ) -> Result<String, Error> {
        (**self).generate_key(algorithm, bits)
    }

    fn import_key(&mut self, pem: &[u8]) -> Result<String, Error> {
        (**self).import_key(pem)
    }

    fn remove_key(&mut self, id: &str) -> Result<(), Error> {
        (**self).remove_key(id)
    }

    fn get_private(&self, id: &str) -> Result<SecretKey, Error> {
        (**self).get_private(id)
    }
}

//----------- State ----------------------------------------------------------

/// The life cycle state of a [`Keystore`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum State {
    /// The keystore has been created but not used yet.
    Constructed,

    /// The backend's persistent state has been prepared.
    Initialized,

    /// A session is open and keys can be accessed.
    Open,

    /// The session has been closed.
    Closed,
}

//--- Display

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Constructed => "constructed",
            State::Initialized => "initialized",
            State::Open => "open",
            State::Closed => "closed",
        })
    }
}

//----------- Keystore -------------------------------------------------------

/// A private key store.
pub struct Keystore<B: Backend> {
    backend: B,
    state: State,
}

impl<B: Backend> Keystore<B> {
    /// Creates a new keystore using the given backend.
    pub fn new(backend: B) -> Self {
        Keystore {
            backend,
            state: State::Constructed,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns a reference to the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Prepares the backend's persistent state.
    ///
    /// This is not allowed while the keystore is open.
    pub fn init(&mut self, config: &str) -> Result<(), Error> {
        if self.state == State::Open {
            return Err(self.invalid_state("initialize"));
        }
        self.backend
            .init(config)
            .inspect_err(|err| error!("Keystore init failed: {err}"))?;
        if self.state == State::Constructed {
            self.state = State::Initialized;
        }
        debug!("Keystore initialized");
        Ok(())
    }

    /// Opens a session with the backend.
    pub fn open(&mut self, config: &str) -> Result<(), Error> {
        if self.state == State::Open {
            return Err(self.invalid_state("open"));
        }
        self.backend
            .open(config)
            .inspect_err(|err| error!("Keystore open failed: {err}"))?;
        self.state = State::Open;
        debug!("Keystore opened");
        Ok(())
    }

    /// Closes the session.
    ///
    /// Closing a keystore that isn't open does nothing. If the backend fails
    /// to close, the keystore is still considered closed.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.state != State::Open {
            return Ok(());
        }
        self.state = State::Closed;
        self.backend
            .close()
            .inspect_err(|err| error!("Keystore close failed: {err}"))?;
        debug!("Keystore closed");
        Ok(())
    }

    /// Closes the keystore and releases the backend.
    pub fn deinit(mut self) -> Result<(), Error> {
        self.close()
    }

    /// Returns the ids of all stored keys in ascending order.
    pub fn list_keys(&self) -> Result<Vec<String>, Error> {
        self.check_open("list keys in")?;
        let mut keys = self.backend.list_keys()?;
        keys.sort_unstable();
        Ok(keys)
    }

    /// Generates a new key and returns its id.
    ///
    /// Algorithms with a fixed key size ignore `bits`.
    pub fn generate_key(
        &mut self,
        algorithm: SecurityAlgorithm,
        bits: u32,
    ) -> Result<String, Error> {
        self.check_open("generate keys in")?;
        if !ring::supports(algorithm) {
            return Err(Error::UnsupportedAlgorithm(algorithm));
        }
        let bits = check_key_size(algorithm, bits)?;
        let id = self
            .backend
            .generate_key(algorithm, bits)
            .inspect_err(|err| error!("Key generation failed: {err}"))?;
        info!("Generated {algorithm} key {id}");
        Ok(id)
    }

    /// Imports a PKCS#8 private key in PEM format and returns its id.
    pub fn import_key(&mut self, pem: &[u8]) -> Result<String, Error> {
        self.check_open("import keys into")?;
        if pem.is_empty() {
            return Err(Error::InvalidArgument("empty PEM document"));
        }
        let id = self
            .backend
            .import_key(pem)
            .inspect_err(|err| error!("Key import failed: {err}"))?;
        info!("Imported key {id}");
        Ok(id)
    }

    /// Removes a stored key.
    ///
    /// Fails with [`Error::KeyNotFound`] if there is no such key.
    pub fn remove_key(&mut self, id: &str) -> Result<(), Error> {
        self.check_open("remove keys from")?;
        if id.is_empty() {
            return Err(Error::InvalidArgument("empty key id"));
        }
        self.backend.remove_key(id)?;
        info!("Removed key {id}");
        Ok(())
    }

    /// Loads a stored key ready for signing.
    pub fn get_private(&self, id: &str) -> Result<SecretKey, Error> {
        self.check_open("get private keys from")?;
        if id.is_empty() {
            return Err(Error::InvalidArgument("empty key id"));
        }
        let key = self.backend.get_private(id)?;
        debug!("Loaded private key {id}");
        Ok(key)
    }

    fn check_open(&self, operation: &'static str) -> Result<(), Error> {
        if self.state == State::Open {
            Ok(())
        } else {
            Err(self.invalid_state(operation))
        }
    }

    fn invalid_state(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state,
        }
    }
}

//--- Drop

impl<B: Backend> Drop for Keystore<B> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!("Failed to close keystore on drop: {err}");
        }
    }
}

//----------- Helpers for backends -------------------------------------------

/// Returns the key id of a private key.
///
/// This is the id of its public key in DNSKEY record data. The algorithm
/// only affects the encoding for the key family, so RSA keys use RSASHA256.
pub(crate) fn private_key_id(key: &SecretKey) -> Result<String, Error> {
    let algorithm = key.algorithm().unwrap_or(SecurityAlgorithm::RSASHA256);
    let rdata = dnskey::encode(&key.public_key()?, algorithm)?;
    Ok(key_id(&rdata))
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::memory::MemoryKeystore;
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn life_cycle() {
        crate::logging::init_logging();
        let mut store = Keystore::new(MemoryKeystore::new());
        assert_eq!(store.state(), State::Constructed);
        store.init("").unwrap();
        assert_eq!(store.state(), State::Initialized);
        store.open("").unwrap();
        assert_eq!(store.state(), State::Open);
        assert_eq!(
            store.init(""),
            Err(Error::InvalidState {
                operation: "initialize",
                state: State::Open
            })
        );
        assert_eq!(store.open("").unwrap_err().kind(), ErrorKind::InvalidState);
        store.close().unwrap();
        assert_eq!(store.state(), State::Closed);
        store.close().unwrap();
        assert_eq!(store.state(), State::Closed);
        store.open("").unwrap();
        store.deinit().unwrap();
    }

    #[test]
    fn closed_store() {
        let mut store = Keystore::new(MemoryKeystore::new());
        let err = store.list_keys().unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot list keys in a keystore that is constructed"
        );
        assert_eq!(
            store
                .generate_key(SecurityAlgorithm::ED25519, 0)
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn generate_validation() {
        crate::logging::init_logging();
        let mut store = Keystore::new(MemoryKeystore::new());
        store.open("").unwrap();
        assert_eq!(
            store.generate_key(SecurityAlgorithm::DSA, 1024),
            Err(Error::UnsupportedAlgorithm(SecurityAlgorithm::DSA))
        );
        assert_eq!(
            store.generate_key(SecurityAlgorithm::RSASHA1, 2048),
            Err(Error::UnsupportedAlgorithm(SecurityAlgorithm::RSASHA1))
        );
        assert_eq!(
            store.generate_key(SecurityAlgorithm::RSASHA256, 1024),
            Err(Error::InvalidKeySize {
                algorithm: SecurityAlgorithm::RSASHA256,
                min: 2048,
                max: 4096,
                requested: 1024
            })
        );
        assert!(store.list_keys().unwrap().is_empty());

        let id = store
            .generate_key(SecurityAlgorithm::ECDSAP256SHA256, 0)
            .unwrap();
        assert_eq!(store.list_keys().unwrap(), [id.clone()]);
        let key = store.get_private(&id).unwrap();
        assert_eq!(private_key_id(&key).unwrap(), id);
    }

    #[test]
    fn state_display() {
        assert_eq!(State::Initialized.to_string(), "initialized");
        assert_eq!(
            Error::InvalidState {
                operation: "remove keys from",
                state: State::Closed
            }
            .to_string(),
            "cannot remove keys from a keystore that is closed"
        );
    }
}
