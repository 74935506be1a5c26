//! The public key field of DNSKEY record data.
//!
//! The layout of the public key in a DNSKEY record depends on the family of
//! the key's algorithm:
//!
//! - RSA keys ([RFC 3110, Section 2]) start with the length of the public
//!   exponent, either as a single octet or, if it doesn't fit, as a zero
//!   octet followed by a 16 bit length. Exponent and modulus follow.
//! - ECDSA keys ([RFC 6605, Section 4]) are the X and Y coordinates of the
//!   public point, each with the width of the curve. There is no point
//!   format prefix.
//! - EdDSA keys ([RFC 8080, Section 3]) are the encoded public point.
//!
//! [RFC 3110, Section 2]: https://tools.ietf.org/html/rfc3110#section-2
//! [RFC 6605, Section 4]: https://tools.ietf.org/html/rfc6605#section-4
//! [RFC 8080, Section 3]: https://tools.ietf.org/html/rfc8080#section-3

use std::vec::Vec;

use octseq::parse::Parser;

use super::common::KeyFamily;
use super::der::to_fixed_width;
use crate::base::iana::SecurityAlgorithm;
use crate::error::Error;

//----------- PublicKey ------------------------------------------------------

/// A public key independent of any crypto backend.
///
/// The key doesn't know its algorithm. It is always paired with one, for
/// instance in a [`KeyHandle`][crate::key::KeyHandle].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PublicKey {
    /// An RSA public key.
    Rsa {
        /// The public exponent as an unsigned big-endian integer.
        exponent: Vec<u8>,

        /// The modulus as an unsigned big-endian integer.
        modulus: Vec<u8>,
    },

    /// An ECDSA public point.
    ///
    /// Both coordinates have the width of the curve.
    Ecdsa { x: Vec<u8>, y: Vec<u8> },

    /// An encoded EdDSA public point.
    EdDsa(Vec<u8>),
}

impl PublicKey {
    /// Creates an ECDSA key from an uncompressed SEC 1 point.
    ///
    /// This is the `0x04` octet followed by both coordinates.
    pub fn from_uncompressed_point(point: &[u8]) -> Result<Self, Error> {
        match point.split_first() {
            Some((&0x04, coords))
                if !coords.is_empty() && coords.len() % 2 == 0 =>
            {
                let (x, y) = coords.split_at(coords.len() / 2);
                Ok(PublicKey::Ecdsa {
                    x: x.to_vec(),
                    y: y.to_vec(),
                })
            }
            _ => Err(Error::MalformedEncoding("not an uncompressed point")),
        }
    }

    /// Returns the uncompressed SEC 1 point of an ECDSA key.
    pub fn to_uncompressed_point(&self) -> Option<Vec<u8>> {
        match self {
            PublicKey::Ecdsa { x, y } => {
                let mut res = Vec::with_capacity(1 + x.len() + y.len());
                res.push(0x04);
                res.extend_from_slice(x);
                res.extend_from_slice(y);
                Some(res)
            }
            _ => None,
        }
    }

    /// Returns whether the key has the layout of the given family.
    pub fn matches(&self, family: KeyFamily) -> bool {
        match (self, family) {
            (PublicKey::Rsa { .. }, KeyFamily::Rsa) => true,
            (PublicKey::Ecdsa { x, y }, KeyFamily::Ecdsa { coord_len }) => {
                x.len() == coord_len && y.len() == coord_len
            }
            (PublicKey::EdDsa(point), KeyFamily::EdDsa { point_len, .. }) => {
                point.len() == point_len
            }
            _ => false,
        }
    }

    /// Returns the size of the key in bits.
    ///
    /// For RSA, this is the size of the modulus. For the other families,
    /// it is the size of the encoded point.
    pub fn bits(&self) -> u32 {
        let bytes = match self {
            PublicKey::Rsa { modulus, .. } => {
                let start = modulus
                    .iter()
                    .position(|&x| x != 0)
                    .unwrap_or(modulus.len());
                let modulus = &modulus[start..];
                return match modulus.first() {
                    Some(&first) => {
                        (modulus.len() as u32 - 1) * 8
                            + (8 - first.leading_zeros())
                    }
                    None => 0,
                };
            }
            PublicKey::Ecdsa { x, .. } => x.len(),
            PublicKey::EdDsa(point) => point.len(),
        };
        bytes as u32 * 8
    }
}

//------------ encode --------------------------------------------------------

/// Encodes a public key into the DNSKEY public key field for `algorithm`.
///
/// ECDSA coordinates shorter than the curve width are zero padded. Fails
/// with [`Error::UnsupportedAlgorithm`] for algorithms without a known
/// layout and with [`Error::InvalidArgument`] if the key doesn't fit the
/// algorithm.
pub fn encode(
    key: &PublicKey,
    algorithm: SecurityAlgorithm,
) -> Result<Vec<u8>, Error> {
    match (KeyFamily::require(algorithm)?, key) {
        (KeyFamily::Rsa, PublicKey::Rsa { exponent, modulus }) => {
            rsa_encode(exponent, modulus)
        }
        (KeyFamily::Ecdsa { coord_len }, PublicKey::Ecdsa { x, y }) => {
            let mut res = to_fixed_width(x, coord_len)
                .map_err(|_| Error::InvalidArgument("coordinate too wide"))?;
            res.extend_from_slice(
                &to_fixed_width(y, coord_len).map_err(|_| {
                    Error::InvalidArgument("coordinate too wide")
                })?,
            );
            Ok(res)
        }
        (KeyFamily::EdDsa { point_len, .. }, PublicKey::EdDsa(point)) => {
            if point.len() != point_len {
                return Err(Error::InvalidArgument("wrong point length"));
            }
            Ok(point.clone())
        }
        _ => Err(Error::InvalidArgument("key does not match algorithm")),
    }
}

/// Encodes an RSA public exponent and modulus.
fn rsa_encode(exponent: &[u8], modulus: &[u8]) -> Result<Vec<u8>, Error> {
    if exponent.is_empty() || modulus.is_empty() {
        return Err(Error::InvalidArgument("empty RSA key component"));
    }
    let exp_len = u16::try_from(exponent.len())
        .map_err(|_| Error::InvalidArgument("RSA exponent too long"))?;

    let mut res = Vec::new();
    res.try_reserve_exact(3 + exponent.len() + modulus.len())?;
    match u8::try_from(exp_len) {
        Ok(len) => res.push(len),
        Err(_) => {
            res.push(0);
            res.extend_from_slice(&exp_len.to_be_bytes());
        }
    }
    res.extend_from_slice(exponent);
    res.extend_from_slice(modulus);
    Ok(res)
}

//------------ decode --------------------------------------------------------

/// Decodes the DNSKEY public key field for `algorithm`.
///
/// Fails with [`Error::MalformedEncoding`] if the length of the data does
/// not fit the layout of the algorithm.
pub fn decode(
    algorithm: SecurityAlgorithm,
    rdata: &[u8],
) -> Result<PublicKey, Error> {
    match KeyFamily::require(algorithm)? {
        KeyFamily::Rsa => rsa_decode(rdata),
        KeyFamily::Ecdsa { coord_len } => {
            if rdata.len() != 2 * coord_len {
                return Err(Error::MalformedEncoding("wrong ECDSA key length"));
            }
            let (x, y) = rdata.split_at(coord_len);
            Ok(PublicKey::Ecdsa {
                x: x.to_vec(),
                y: y.to_vec(),
            })
        }
        KeyFamily::EdDsa { point_len, .. } => {
            if rdata.len() != point_len {
                return Err(Error::MalformedEncoding("wrong EdDSA key length"));
            }
            Ok(PublicKey::EdDsa(rdata.to_vec()))
        }
    }
}

fn rsa_decode(rdata: &[u8]) -> Result<PublicKey, Error> {
    let mut parser = Parser::from_ref(rdata);
    let exp_len = match parser.parse_u8()? {
        0 => usize::from(parser.parse_u16_be()?),
        len => usize::from(len),
    };
    if exp_len == 0 {
        return Err(Error::MalformedEncoding("empty RSA exponent"));
    }
    if parser.remaining() <= exp_len {
        return Err(Error::MalformedEncoding("RSA exponent past end of key"));
    }
    let exponent = parser.peek(exp_len)?.to_vec();
    parser.advance(exp_len)?;
    let modulus = parser.peek_all().to_vec();
    Ok(PublicKey::Rsa { exponent, modulus })
}

//============ Tests =========================================================
