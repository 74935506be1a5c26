//! DNSSEC signing using `ring`.
//!
//! This backend supports the following algorithms:
//!
//! - RSA/SHA-256 and RSA/SHA-512 (2048-bit keys or larger)
//! - ECDSA P-256/SHA-256
//! - ECDSA P-384/SHA-384
//! - Ed25519
//!
//! Verification additionally supports RSA/SHA-1 with keys of 1024 bits or
//! more. `ring` cannot generate RSA keys, so RSA key generation is done
//! through the `rsa` crate and the result handed to `ring` as PKCS#8.

use core::fmt;
use std::vec::Vec;

use ring::digest;
use ring::digest::SHA1_FOR_LEGACY_USE_ONLY;
use ring::digest::{Context, Digest as RingDigest};
use ring::rand::SystemRandom;
use ring::signature::{
    self, EcdsaKeyPair, Ed25519KeyPair, KeyPair as _, RsaKeyPair,
    UnparsedPublicKey,
};
use tracing::debug;

use super::common::{DigestType, KeyFamily};
use super::der;
use super::dnskey::PublicKey;
use crate::base::iana::SecurityAlgorithm;
use crate::error::Error;

/// The algorithms this backend can generate keys for and sign with.
pub const SIGNING_ALGORITHMS: &[SecurityAlgorithm] = &[
    SecurityAlgorithm::RSASHA256,
    SecurityAlgorithm::RSASHA512,
    SecurityAlgorithm::ECDSAP256SHA256,
    SecurityAlgorithm::ECDSAP384SHA384,
    SecurityAlgorithm::ED25519,
];

/// Returns whether the backend can generate keys for and sign with an
/// algorithm.
pub fn supports(algorithm: SecurityAlgorithm) -> bool {
    SIGNING_ALGORITHMS.contains(&algorithm)
}

//----------- DigestBuilder --------------------------------------------------

/// Builder for computing a message digest.
pub struct DigestBuilder(Context);

impl DigestBuilder {
    /// Create a new builder for a specified digest type.
    pub fn new(digest_type: DigestType) -> Self {
        Self(match digest_type {
            DigestType::Sha1 => Context::new(&SHA1_FOR_LEGACY_USE_ONLY),
            DigestType::Sha256 => Context::new(&digest::SHA256),
            DigestType::Sha384 => Context::new(&digest::SHA384),
        })
    }

    /// Add input to the digest computation.
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data)
    }

    /// Finish computing the digest.
    pub fn finish(self) -> Digest {
        Digest(self.0.finish())
    }
}

//----------- Digest ---------------------------------------------------------

/// A message digest.
pub struct Digest(RingDigest);

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

//----------- Verification ---------------------------------------------------

impl PublicKey {
    /// Verifies RRSIG signature data over `signed_data`.
    ///
    /// The signature has the format used in RRSIG records, i.e., fixed
    /// width `r` and `s` for ECDSA.
    pub fn verify(
        &self,
        algorithm: SecurityAlgorithm,
        signed_data: &[u8],
        signature: &[u8],
    ) -> Result<(), Error> {
        match KeyFamily::of(algorithm) {
            Some(KeyFamily::Ecdsa { coord_len })
                if signature.len() != 2 * coord_len =>
            {
                return Err(Error::MalformedEncoding(
                    "ECDSA signature has wrong length",
                ));
            }
            Some(KeyFamily::EdDsa { signature_len, .. })
                if signature.len() != signature_len =>
            {
                return Err(Error::MalformedEncoding(
                    "EdDSA signature has wrong length",
                ));
            }
            _ => {}
        }

        let res = match (algorithm, self) {
            (
                SecurityAlgorithm::RSASHA1
                | SecurityAlgorithm::RSASHA1_NSEC3_SHA1
                | SecurityAlgorithm::RSASHA256
                | SecurityAlgorithm::RSASHA512,
                PublicKey::Rsa { exponent, modulus },
            ) => {
                let parameters = match algorithm {
                    SecurityAlgorithm::RSASHA256 => {
                        &signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY
                    }
                    SecurityAlgorithm::RSASHA512 => {
                        &signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY
                    }
                    _ => &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
                };
                let public_key = signature::RsaPublicKeyComponents {
                    n: modulus,
                    e: exponent,
                };
                public_key.verify(parameters, signed_data, signature)
            }
            (
                SecurityAlgorithm::ECDSAP256SHA256
                | SecurityAlgorithm::ECDSAP384SHA384,
                PublicKey::Ecdsa { .. },
            ) => {
                let verification = match algorithm {
                    SecurityAlgorithm::ECDSAP256SHA256 => {
                        &signature::ECDSA_P256_SHA256_FIXED
                    }
                    _ => &signature::ECDSA_P384_SHA384_FIXED,
                };
                // Ring expects the uncompressed point with its 0x04 prefix.
                let point = self.to_uncompressed_point().unwrap_or_default();
                UnparsedPublicKey::new(verification, point)
                    .verify(signed_data, signature)
            }
            (SecurityAlgorithm::ED25519, PublicKey::EdDsa(point)) => {
                UnparsedPublicKey::new(&signature::ED25519, point)
                    .verify(signed_data, signature)
            }
            _ => return Err(Error::UnsupportedAlgorithm(algorithm)),
        };
        res.map_err(|_| Error::BackendFailure("bad signature".into()))
    }
}

//----------- SecretKey ------------------------------------------------------

/// A private key backed by `ring`.
///
/// This is the live key material a keystore hands out for signing. The key
/// is released when the value is dropped.
pub struct SecretKey {
    pair: KeyPair,
    rng: SystemRandom,
}

// Note: ring does not implement Clone for *KeyPair.
enum KeyPair {
    /// An RSA key usable with any RSA algorithm the backend signs with.
    Rsa(RsaKeyPair),

    /// An ECDSA P-256 key producing DER signatures.
    EcdsaP256(EcdsaKeyPair),

    /// An ECDSA P-384 key producing DER signatures.
    EcdsaP384(EcdsaKeyPair),

    /// An Ed25519 key.
    Ed25519(Ed25519KeyPair),
}

impl SecretKey {
    /// Loads a private key from a PKCS#8 document.
    ///
    /// The type of key is detected from the document.
    pub fn from_pkcs8(der: &[u8]) -> Result<Self, Error> {
        let rng = SystemRandom::new();

        let pair = if let Ok(key) = RsaKeyPair::from_pkcs8(der) {
            KeyPair::Rsa(key)
        } else if let Ok(key) = EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            der,
            &rng,
        ) {
            KeyPair::EcdsaP256(key)
        } else if let Ok(key) = EcdsaKeyPair::from_pkcs8(
            &signature::ECDSA_P384_SHA384_ASN1_SIGNING,
            der,
            &rng,
        ) {
            KeyPair::EcdsaP384(key)
        } else if let Ok(key) = Ed25519KeyPair::from_pkcs8_maybe_unchecked(der)
        {
            KeyPair::Ed25519(key)
        } else {
            return Err(Error::MalformedEncoding(
                "unsupported or invalid PKCS#8 private key",
            ));
        };
        Ok(SecretKey { pair, rng })
    }

    /// Returns whether the key can sign with the given algorithm.
    pub fn supports(&self, algorithm: SecurityAlgorithm) -> bool {
        match self.pair {
            KeyPair::Rsa(_) => matches!(
                algorithm,
                SecurityAlgorithm::RSASHA256 | SecurityAlgorithm::RSASHA512
            ),
            KeyPair::EcdsaP256(_) => {
                algorithm == SecurityAlgorithm::ECDSAP256SHA256
            }
            KeyPair::EcdsaP384(_) => {
                algorithm == SecurityAlgorithm::ECDSAP384SHA384
            }
            KeyPair::Ed25519(_) => algorithm == SecurityAlgorithm::ED25519,
        }
    }

    /// Returns the algorithm to use with the key if there is only one.
    ///
    /// RSA keys can be used with more than one algorithm and return `None`.
    pub fn algorithm(&self) -> Option<SecurityAlgorithm> {
        match self.pair {
            KeyPair::Rsa(_) => None,
            KeyPair::EcdsaP256(_) => Some(SecurityAlgorithm::ECDSAP256SHA256),
            KeyPair::EcdsaP384(_) => Some(SecurityAlgorithm::ECDSAP384SHA384),
            KeyPair::Ed25519(_) => Some(SecurityAlgorithm::ED25519),
        }
    }

    /// Returns the public key of the key pair.
    pub fn public_key(&self) -> Result<PublicKey, Error> {
        match &self.pair {
            KeyPair::Rsa(key) => {
                let components: ring::rsa::PublicKeyComponents<Vec<u8>> =
                    key.public().into();
                Ok(PublicKey::Rsa {
                    exponent: components.e,
                    modulus: components.n,
                })
            }
            KeyPair::EcdsaP256(key) | KeyPair::EcdsaP384(key) => {
                PublicKey::from_uncompressed_point(key.public_key().as_ref())
            }
            KeyPair::Ed25519(key) => {
                Ok(PublicKey::EdDsa(key.public_key().as_ref().to_vec()))
            }
        }
    }

    /// Signs `data` and returns signature data in RRSIG format.
    pub fn sign(
        &self,
        algorithm: SecurityAlgorithm,
        data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        if !self.supports(algorithm) {
            return Err(Error::UnsupportedAlgorithm(algorithm));
        }
        match &self.pair {
            KeyPair::Rsa(key) => {
                let padding = if algorithm == SecurityAlgorithm::RSASHA512 {
                    &signature::RSA_PKCS1_SHA512
                } else {
                    &signature::RSA_PKCS1_SHA256
                };
                let mut buf = vec![0u8; key.public().modulus_len()];
                key.sign(padding, &self.rng, data, &mut buf).map_err(|_| {
                    Error::BackendFailure(format!("{algorithm} signing failed"))
                })?;
                Ok(buf)
            }
            KeyPair::EcdsaP256(key) | KeyPair::EcdsaP384(key) => {
                let sig = key.sign(&self.rng, data).map_err(|_| {
                    Error::BackendFailure(format!("{algorithm} signing failed"))
                })?;
                let coord_len = match KeyFamily::require(algorithm)? {
                    KeyFamily::Ecdsa { coord_len } => coord_len,
                    _ => return Err(Error::UnsupportedAlgorithm(algorithm)),
                };
                der::der_to_rrsig(sig.as_ref(), coord_len)
            }
            KeyPair::Ed25519(key) => Ok(key.sign(data).as_ref().to_vec()),
        }
    }
}

//--- Debug

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.pair {
            KeyPair::Rsa(_) => "Rsa",
            KeyPair::EcdsaP256(_) => "EcdsaP256",
            KeyPair::EcdsaP384(_) => "EcdsaP384",
            KeyPair::Ed25519(_) => "Ed25519",
        };
        f.debug_tuple("SecretKey").field(&kind).finish()
    }
}

//----------- generate() -----------------------------------------------------

/// Generates a new private key and returns it as a PKCS#8 document.
///
/// The caller is expected to have checked `bits` against the key size
/// policy. It is only used for RSA keys.
pub fn generate(
    algorithm: SecurityAlgorithm,
    bits: u32,
) -> Result<Vec<u8>, Error> {
    let rng = SystemRandom::new();
    let doc = match algorithm {
        SecurityAlgorithm::ECDSAP256SHA256 => EcdsaKeyPair::generate_pkcs8(
            &signature::ECDSA_P256_SHA256_ASN1_SIGNING,
            &rng,
        )?
        .as_ref()
        .to_vec(),
        SecurityAlgorithm::ECDSAP384SHA384 => EcdsaKeyPair::generate_pkcs8(
            &signature::ECDSA_P384_SHA384_ASN1_SIGNING,
            &rng,
        )?
        .as_ref()
        .to_vec(),
        SecurityAlgorithm::ED25519 => {
            Ed25519KeyPair::generate_pkcs8(&rng)?.as_ref().to_vec()
        }
        SecurityAlgorithm::RSASHA256 | SecurityAlgorithm::RSASHA512 => {
            generate_rsa(bits)?
        }
        _ => return Err(Error::UnsupportedAlgorithm(algorithm)),
    };
    debug!("Generated {algorithm} key");
    Ok(doc)
}

/// Generates an RSA key with the `rsa` crate.
fn generate_rsa(bits: u32) -> Result<Vec<u8>, Error> {
    use rsa::pkcs8::EncodePrivateKey;

    let mut rng = rand::rngs::OsRng;
    let key = rsa::RsaPrivateKey::new(&mut rng, bits as usize)
        .map_err(|err| Error::BackendFailure(err.to_string()))?;
    let doc = key
        .to_pkcs8_der()
        .map_err(|err| Error::BackendFailure(err.to_string()))?;
    Ok(doc.as_bytes().to_vec())
}

//============ Tests =========================================================
