//! A keystore backend keeping keys in memory.
//!
//! Keys are kept as PKCS#8 documents and parsed again every time they are
//! handed out, just like the PEM backend does. Everything is lost when the
//! backend is dropped.

use std::collections::BTreeMap;
use std::string::String;
use std::vec::Vec;

use tracing::debug;

use super::{private_key_id, Backend};
use crate::base::iana::SecurityAlgorithm;
use crate::crypto::ring::{self, SecretKey};
use crate::error::Error;

//----------- MemoryKeystore -------------------------------------------------

#[derive(Clone, Debug, Default)]
pub struct MemoryKeystore {
    keys: BTreeMap<String, Vec<u8>>,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Default::default()
    }

    fn insert(&mut self, pkcs8: Vec<u8>) -> Result<String, Error> {
        let id = private_key_id(&SecretKey::from_pkcs8(&pkcs8)?)?;
        self.keys.insert(id.clone(), pkcs8);
        Ok(id)
    }
}

impl Backend for MemoryKeystore {
    fn init(&mut self, _config: &str) -> Result<(), Error> {
        Ok(())
    }

    fn open(&mut self, _config: &str) -> Result<(), Error> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.keys.keys().cloned().collect())
    }

    fn generate_key(
        &mut self,
        algorithm: SecurityAlgorithm,
        bits: u32,
    ) -> Result<String, Error> {
        let pkcs8 = ring::generate(algorithm, bits)?;
        self.insert(pkcs8)
    }

    fn import_key(&mut self, pem: &[u8]) -> Result<String, Error> {
        let pkcs8 = super::pem::parse_pem(pem)?;
        let id = self.insert(pkcs8)?;
        debug!("Stored key {id} in memory");
        Ok(id)
    }

    fn remove_key(&mut self, id: &str) -> Result<(), Error> {
        match self.keys.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::KeyNotFound(id.into())),
        }
    }

    fn get_private(&self, id: &str) -> Result<SecretKey, Error> {
        let pkcs8 = self
            .keys
            .get(id)
            .ok_or_else(|| Error::KeyNotFound(id.into()))?;
        SecretKey::from_pkcs8(pkcs8)
    }
}
