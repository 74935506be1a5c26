//! DNSSEC keys and their binding to private keys in a keystore.
//!
//! A [`KeyHandle`] is what the rest of a signer works with. It knows the
//! algorithm and flags of a key and its public key, so it can produce the
//! DNSKEY record for publication. Once a private key from a [`Keystore`]
//! has been bound to it, it can sign data as well.

use std::string::String;
use std::vec::Vec;

use tracing::debug;

use crate::base::iana::SecurityAlgorithm;
use crate::crypto::common::DigestType;
use crate::crypto::dnskey::{self, PublicKey};
use crate::crypto::ring::{DigestBuilder, SecretKey};
use crate::error::Error;
use crate::keystore::{Backend, Keystore};
use crate::rdata::Dnskey;
use crate::utils::base16;

//----------- KeyHandle ------------------------------------------------------

/// A DNSSEC key.
///
/// A handle holds at most one private key. The private key is released
/// when the handle is dropped.
#[derive(Debug)]
pub struct KeyHandle {
    algorithm: SecurityAlgorithm,
    flags: u16,
    id: Option<String>,
    public: Option<PublicKey>,
    private: Option<SecretKey>,
}

impl KeyHandle {
    /// Creates a handle without any key material.
    ///
    /// The public key is filled in when a private key is bound through
    /// [`import_private`][Self::import_private].
    pub fn new(algorithm: SecurityAlgorithm, flags: u16) -> Self {
        KeyHandle {
            algorithm,
            flags,
            id: None,
            public: None,
            private: None,
        }
    }

    /// Creates a handle from DNSKEY record data.
    ///
    /// The handle has no private key.
    pub fn from_dnskey(rdata: &[u8]) -> Result<Self, Error> {
        let dnskey = Dnskey::from_rdata(rdata)?;
        if dnskey.protocol() != Dnskey::PROTOCOL {
            return Err(Error::MalformedEncoding("DNSKEY protocol is not 3"));
        }
        let public = dnskey::decode(dnskey.algorithm(), dnskey.public_key())?;
        Ok(KeyHandle {
            algorithm: dnskey.algorithm(),
            flags: dnskey.flags(),
            id: Some(key_id(dnskey.public_key())),
            public: Some(public),
            private: None,
        })
    }

    /// Loads a key from a keystore into a new handle.
    ///
    /// This is how a freshly generated key is turned into a handle.
    pub fn load<B: Backend>(
        keystore: &Keystore<B>,
        id: &str,
        algorithm: SecurityAlgorithm,
        flags: u16,
    ) -> Result<Self, Error> {
        let mut key = KeyHandle::new(algorithm, flags);
        key.import_private(keystore, id)?;
        Ok(key)
    }

    pub fn algorithm(&self) -> SecurityAlgorithm {
        self.algorithm
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn set_flags(&mut self, flags: u16) {
        self.flags = flags
    }

    /// Returns the key id if the public key is known.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public.as_ref()
    }

    /// Returns whether a private key is bound to the handle.
    pub fn has_private(&self) -> bool {
        self.private.is_some()
    }

    /// Returns the DNSKEY record data for the key.
    pub fn dnskey(&self) -> Result<Dnskey<Vec<u8>>, Error> {
        let public = self
            .public
            .as_ref()
            .ok_or(Error::InvalidArgument("key has no public key"))?;
        Dnskey::new(
            self.flags,
            Dnskey::PROTOCOL,
            self.algorithm,
            dnskey::encode(public, self.algorithm)?,
        )
    }

    /// Returns the key tag of the key's DNSKEY record.
    pub fn key_tag(&self) -> Result<u16, Error> {
        self.dnskey().map(|dnskey| dnskey.key_tag())
    }

    /// Binds the private key stored under `id` in `keystore` to the handle.
    ///
    /// If the handle has a public key already, the private key has to match
    /// it. Otherwise the public key is taken from the private key. The
    /// handle is only changed if the whole operation succeeds.
    pub fn import_private<B: Backend>(
        &mut self,
        keystore: &Keystore<B>,
        id: &str,
    ) -> Result<(), Error> {
        if self.algorithm == SecurityAlgorithm::DELETE {
            return Err(Error::InvalidArgument("key has no algorithm"));
        }
        if id.is_empty() {
            return Err(Error::InvalidArgument("empty key id"));
        }
        if self.private.is_some() {
            return Err(Error::AlreadyBound);
        }

        let private = keystore.get_private(id)?;

        // From here on, returning early drops `private`.
        if !private.supports(self.algorithm) {
            return Err(Error::UnsupportedAlgorithm(self.algorithm));
        }
        let public = private.public_key()?;
        let rdata = dnskey::encode(&public, self.algorithm)?;
        if let Some(existing) = self.public.as_ref() {
            if dnskey::encode(existing, self.algorithm)? != rdata {
                return Err(Error::InvalidArgument(
                    "private key does not match public key",
                ));
            }
        }

        *self = KeyHandle {
            algorithm: self.algorithm,
            flags: self.flags,
            id: Some(key_id(&rdata)),
            public: Some(public),
            private: Some(private),
        };
        debug!("Bound private key {id} to {} key", self.algorithm);
        Ok(())
    }

    /// Signs `data` with the bound private key.
    ///
    /// The signature is in the format used in RRSIG records.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, Error> {
        self.private
            .as_ref()
            .ok_or(Error::InvalidArgument("key has no private key"))?
            .sign(self.algorithm, data)
    }

    /// Verifies an RRSIG format signature over `data`.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), Error> {
        self.public
            .as_ref()
            .ok_or(Error::InvalidArgument("key has no public key"))?
            .verify(self.algorithm, data, signature)
    }
}

//----------- Key ids --------------------------------------------------------

/// The length of a key id in characters.
pub const KEY_ID_LEN: usize = 40;

/// Returns the key id for the public key field of DNSKEY record data.
///
/// The id is the lower case hex encoded SHA-1 digest of the public key.
/// It doesn't depend on the flags so a key keeps its id when the flags
/// change.
pub fn key_id(public_key: &[u8]) -> String {
    let mut builder = DigestBuilder::new(DigestType::Sha1);
    builder.update(public_key);
    base16::encode_string(&builder.finish())
}

/// Returns whether a string looks like a key id.
pub fn is_key_id(id: &str) -> bool {
    id.len() == KEY_ID_LEN && id.bytes().all(|ch| ch.is_ascii_hexdigit())
}

//============ Tests =========================================================
