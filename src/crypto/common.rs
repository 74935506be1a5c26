//! Algorithm properties shared by the codecs and the signing backend.
//!
//! Everything that depends on which family an algorithm belongs to is
//! looked up through [`KeyFamily::of`] so that the codecs and the keystore
//! never have to compare against individual algorithm numbers.

use crate::base::iana::{DigestAlgorithm, SecurityAlgorithm};
use crate::error::Error;

//----------- KeyFamily ------------------------------------------------------

/// The family of an algorithm determining its key and signature layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyFamily {
    /// RSA keys: variable length exponent and modulus.
    Rsa,

    /// ECDSA keys on a prime curve.
    Ecdsa {
        /// The width of a single coordinate or integer in bytes.
        coord_len: usize,
    },

    /// EdDSA keys.
    EdDsa {
        /// The width of an encoded point in bytes.
        point_len: usize,

        /// The width of a signature in bytes.
        signature_len: usize,
    },
}

impl KeyFamily {
    /// Returns the family of an algorithm.
    ///
    /// Returns `None` for algorithms without a known key layout.
    pub fn of(algorithm: SecurityAlgorithm) -> Option<Self> {
        match algorithm {
            SecurityAlgorithm::RSAMD5
            | SecurityAlgorithm::RSASHA1
            | SecurityAlgorithm::RSASHA1_NSEC3_SHA1
            | SecurityAlgorithm::RSASHA256
            | SecurityAlgorithm::RSASHA512 => Some(KeyFamily::Rsa),
            SecurityAlgorithm::ECDSAP256SHA256 => {
                Some(KeyFamily::Ecdsa { coord_len: 32 })
            }
            SecurityAlgorithm::ECDSAP384SHA384 => {
                Some(KeyFamily::Ecdsa { coord_len: 48 })
            }
            SecurityAlgorithm::ED25519 => Some(KeyFamily::EdDsa {
                point_len: 32,
                signature_len: 64,
            }),
            SecurityAlgorithm::ED448 => Some(KeyFamily::EdDsa {
                point_len: 57,
                signature_len: 114,
            }),
            _ => None,
        }
    }

    /// Returns the family of an algorithm or an error if it has none.
    pub fn require(algorithm: SecurityAlgorithm) -> Result<Self, Error> {
        Self::of(algorithm).ok_or(Error::UnsupportedAlgorithm(algorithm))
    }
}

//----------- Key sizes ------------------------------------------------------

/// The range of key sizes in bits accepted for an algorithm.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeySizeRange {
    /// The smallest accepted size.
    pub min: u32,

    /// The largest accepted size.
    pub max: u32,

    /// Accepted sizes must be a multiple of this.
    pub step: u32,

    /// The size used when the caller doesn't ask for one.
    pub default: u32,
}

impl KeySizeRange {
    const fn fixed(bits: u32) -> Self {
        KeySizeRange {
            min: bits,
            max: bits,
            step: 1,
            default: bits,
        }
    }

    /// Returns whether the range has exactly one size.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

/// Returns the key sizes the signing backend can generate for an algorithm.
///
/// RSA keys are limited to 2048..=4096 bits because the backend refuses to
/// sign with shorter moduli. [RFC 5702] caps RSA/SHA-256 and RSA/SHA-512
/// keys at 4096 bits.
///
/// [RFC 5702]: https://www.rfc-editor.org/rfc/rfc5702.html#section-2.1
pub fn key_size_range(algorithm: SecurityAlgorithm) -> Option<KeySizeRange> {
    match KeyFamily::of(algorithm)? {
        KeyFamily::Rsa => Some(KeySizeRange {
            min: 2048,
            max: 4096,
            step: 8,
            default: 2048,
        }),
        KeyFamily::Ecdsa { coord_len } => {
            Some(KeySizeRange::fixed(coord_len as u32 * 8))
        }
        KeyFamily::EdDsa { .. } if algorithm == SecurityAlgorithm::ED448 => {
            Some(KeySizeRange::fixed(456))
        }
        KeyFamily::EdDsa { point_len, .. } => {
            Some(KeySizeRange::fixed(point_len as u32 * 8))
        }
    }
}

/// Checks that `bits` is an acceptable key size for `algorithm`.
///
/// Algorithms with a fixed key size ignore `bits`. Returns the effective
/// key size.
pub fn check_key_size(
    algorithm: SecurityAlgorithm,
    bits: u32,
) -> Result<u32, Error> {
    let range = key_size_range(algorithm)
        .ok_or(Error::UnsupportedAlgorithm(algorithm))?;
    if range.is_fixed() {
        return Ok(range.default);
    }
    if bits < range.min || bits > range.max || bits % range.step != 0 {
        return Err(Error::InvalidKeySize {
            algorithm,
            min: range.min,
            max: range.max,
            requested: bits,
        });
    }
    Ok(bits)
}

/// Returns the default key size for an algorithm.
pub fn default_key_size(algorithm: SecurityAlgorithm) -> Option<u32> {
    key_size_range(algorithm).map(|range| range.default)
}

//----------- DigestType -----------------------------------------------------

/// Type of message digest to compute.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DigestType {
    /// [FIPS Secure Hash Standard] Section 6.1.
    ///
    /// [FIPS Secure Hash Standard]: http://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf
    Sha1,

    /// [FIPS Secure Hash Standard] Section 6.2.
    ///
    /// [FIPS Secure Hash Standard]: http://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf
    Sha256,

    /// [FIPS Secure Hash Standard] Section 6.5.
    ///
    /// [FIPS Secure Hash Standard]: http://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.180-4.pdf
    Sha384,
}

impl TryFrom<DigestAlgorithm> for DigestType {
    type Error = Error;

    fn try_from(alg: DigestAlgorithm) -> Result<Self, Self::Error> {
        match alg {
            DigestAlgorithm::SHA1 => Ok(DigestType::Sha1),
            DigestAlgorithm::SHA256 => Ok(DigestType::Sha256),
            DigestAlgorithm::SHA384 => Ok(DigestType::Sha384),
            _ => Err(Error::InvalidArgument("unsupported digest algorithm")),
        }
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn families() {
        assert_eq!(
            KeyFamily::of(SecurityAlgorithm::RSASHA1_NSEC3_SHA1),
            Some(KeyFamily::Rsa)
        );
        assert_eq!(
            KeyFamily::of(SecurityAlgorithm::ECDSAP384SHA384),
            Some(KeyFamily::Ecdsa { coord_len: 48 })
        );
        assert_eq!(KeyFamily::of(SecurityAlgorithm::DSA), None);
        assert_eq!(KeyFamily::of(SecurityAlgorithm::DELETE), None);
        assert_eq!(
            KeyFamily::require(SecurityAlgorithm::ECC_GOST),
            Err(Error::UnsupportedAlgorithm(SecurityAlgorithm::ECC_GOST))
        );
    }

    #[test]
    fn key_sizes() {
        let rsa = SecurityAlgorithm::RSASHA256;
        assert_eq!(check_key_size(rsa, 2048), Ok(2048));
        assert_eq!(check_key_size(rsa, 4096), Ok(4096));
        assert_eq!(check_key_size(rsa, 3072), Ok(3072));
        for bits in [0, 1024, 2047, 2050, 4104] {
            assert_eq!(
                check_key_size(rsa, bits).unwrap_err().kind(),
                ErrorKind::InvalidKeySize,
                "{bits}"
            );
        }

        let ec = SecurityAlgorithm::ECDSAP256SHA256;
        assert_eq!(check_key_size(ec, 0), Ok(256));
        assert_eq!(check_key_size(ec, 256), Ok(256));
        assert_eq!(check_key_size(ec, 384), Ok(256));

        assert_eq!(check_key_size(SecurityAlgorithm::ED448, 0), Ok(456));
        assert_eq!(
            check_key_size(SecurityAlgorithm::from_int(200), 256),
            Err(Error::UnsupportedAlgorithm(SecurityAlgorithm::from_int(
                200
            )))
        );
    }
}
