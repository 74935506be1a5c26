//! Conversion between DER encoded signatures and RRSIG signature data.
//!
//! ECDSA and DSA signing primitives commonly produce their signatures as a
//! DER encoded ASN.1 structure:
//!
//! ```text
//! Dss-Sig-Value ::= SEQUENCE {
//!     r   INTEGER,
//!     s   INTEGER
//! }
//! ```
//!
//! The signature field of an RRSIG record, on the other hand, carries the
//! two integers as fixed width unsigned big-endian numbers concatenated
//! together, see [RFC 6605, Section 4].
//!
//! This module provides the two directions of the DER codec, [`decode`]
//! and [`encode`], which deal with the integers exactly as they appear in
//! the DER content octets. Bringing them to the width required by an
//! algorithm is a separate step done by [`to_fixed_width`],
//! [`der_to_rrsig`], and [`rrsig_to_der`].
//!
//! [RFC 6605, Section 4]: https://tools.ietf.org/html/rfc6605#section-4

use std::vec::Vec;

use bcder::decode::SliceSource;
use bcder::encode::{PrimitiveContent, Values};
use bcder::{Mode, Tag, Unsigned};
use tracing::debug;

use crate::error::Error;

//------------ decode --------------------------------------------------------

/// Decodes a DER encoded signature into its `r` and `s` values.
///
/// The values are returned as the content octets of the two DER integers.
/// This includes the leading zero octet that DER requires if the most
/// significant bit of the value is set, so a 48 byte value may well be
/// returned as 49 bytes.
///
/// Anything other than a sequence of exactly two minimally encoded
/// non-negative integers without trailing data is rejected with
/// [`Error::MalformedEncoding`].
pub fn decode(raw: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
    Mode::Der
        .decode(SliceSource::new(raw), |cons| {
            cons.take_sequence(|cons| {
                let r = Unsigned::take_from(cons)?;
                let s = Unsigned::take_from(cons)?;
                Ok((r.as_slice().to_vec(), s.as_slice().to_vec()))
            })
        })
        .map_err(|err| {
            debug!("Invalid DER signature: {err}");
            Error::MalformedEncoding("invalid DER signature")
        })
}

//------------ encode --------------------------------------------------------

/// Encodes `r` and `s` into a DER encoded signature.
///
/// Both values are unsigned big-endian integers. If the most significant
/// bit of a value is set, a zero octet is prepended so the integer isn't
/// read as negative. The values are used as given otherwise.
pub fn encode(r: &[u8], s: &[u8]) -> Result<Vec<u8>, Error> {
    let r = integer_content(r)?;
    let s = integer_content(s)?;
    let values = bcder::encode::sequence((
        r.as_slice().encode_as(Tag::INTEGER),
        s.as_slice().encode_as(Tag::INTEGER),
    ));

    let mut der = Vec::new();
    der.try_reserve_exact(values.encoded_len(Mode::Der))?;
    values.write_encoded(Mode::Der, &mut der)?;
    Ok(der)
}

/// Returns the content octets of the INTEGER holding `value`.
fn integer_content(value: &[u8]) -> Result<Vec<u8>, Error> {
    let Some(&first) = value.first() else {
        return Err(Error::InvalidArgument("empty signature value"));
    };
    let mut res = Vec::new();
    res.try_reserve_exact(value.len() + 1)?;
    if first & 0x80 != 0 {
        res.push(0);
    }
    res.extend_from_slice(value);
    Ok(res)
}

//------------ Width normalization -------------------------------------------

/// Brings an unsigned big-endian integer to exactly `width` octets.
///
/// Leading zero octets are removed and the value is then left-padded with
/// zeros. Fails if the value needs more than `width` octets.
pub fn to_fixed_width(value: &[u8], width: usize) -> Result<Vec<u8>, Error> {
    let value = strip_leading_zeros(value);
    if value.len() > width {
        return Err(Error::MalformedEncoding("integer too wide"));
    }
    let mut res = Vec::new();
    res.try_reserve_exact(width)?;
    res.resize(width - value.len(), 0);
    res.extend_from_slice(value);
    Ok(res)
}

/// Converts a DER encoded signature into RRSIG signature data.
///
/// The result is `r` followed by `s`, each exactly `width` octets long.
pub fn der_to_rrsig(der: &[u8], width: usize) -> Result<Vec<u8>, Error> {
    let (r, s) = decode(der)?;
    let mut res = to_fixed_width(&r, width)?;
    res.extend_from_slice(&to_fixed_width(&s, width)?);
    Ok(res)
}

/// Converts RRSIG signature data into a minimal DER encoded signature.
///
/// The signature data must consist of two integers of equal width.
pub fn rrsig_to_der(signature: &[u8]) -> Result<Vec<u8>, Error> {
    if signature.is_empty() || signature.len() % 2 != 0 {
        return Err(Error::InvalidArgument("odd signature length"));
    }
    let (r, s) = signature.split_at(signature.len() / 2);
    encode(minimal(r), minimal(s))
}

fn strip_leading_zeros(value: &[u8]) -> &[u8] {
    let start = value.iter().position(|&x| x != 0).unwrap_or(value.len());
    &value[start..]
}

/// Returns the shortest representation of a value, keeping one octet for
/// zero.
fn minimal(value: &[u8]) -> &[u8] {
    match strip_leading_zeros(value) {
        [] => &value[value.len() - 1..],
        stripped => stripped,
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;
    use rand::RngCore;

    const RAW: [u8; 103] = [
        0x30, 0x65, 0x02, 0x31, 0x00, 0xcd, 0xe6, 0xf6, 0xf5, 0x2e, 0x4b,
        0xd9, 0xfe, 0x32, 0xf7, 0x94, 0x3d, 0x60, 0x5a, 0x5f, 0x17, 0x0f,
        0x2e, 0xec, 0xd2, 0xc2, 0x6d, 0x79, 0xba, 0x85, 0xf0, 0x57, 0xf4,
        0x15, 0x2d, 0x04, 0xbd, 0xb8, 0xc9, 0x24, 0x15, 0x9a, 0x9b, 0x74,
        0x91, 0x75, 0xb0, 0x22, 0x47, 0x85, 0x19, 0x45, 0x58, 0x02, 0x30,
        0x5b, 0xe2, 0x9d, 0x18, 0x71, 0x5d, 0xb3, 0xd8, 0x0b, 0x5d, 0xee,
        0x9c, 0x38, 0x79, 0x46, 0x29, 0x90, 0x89, 0xd5, 0x21, 0xb0, 0x82,
        0x45, 0x78, 0x2e, 0xf0, 0x68, 0xa9, 0xfa, 0x76, 0xaa, 0xe2, 0x36,
        0x47, 0xcc, 0x3c, 0x74, 0x2d, 0xfc, 0x6d, 0xa6, 0x72, 0x35, 0x29,
        0xc7, 0x21, 0xcf, 0x5c,
    ];

    const RAW_R: [u8; 49] = [
        0x00, 0xcd, 0xe6, 0xf6, 0xf5, 0x2e, 0x4b, 0xd9, 0xfe, 0x32, 0xf7,
        0x94, 0x3d, 0x60, 0x5a, 0x5f, 0x17, 0x0f, 0x2e, 0xec, 0xd2, 0xc2,
        0x6d, 0x79, 0xba, 0x85, 0xf0, 0x57, 0xf4, 0x15, 0x2d, 0x04, 0xbd,
        0xb8, 0xc9, 0x24, 0x15, 0x9a, 0x9b, 0x74, 0x91, 0x75, 0xb0, 0x22,
        0x47, 0x85, 0x19, 0x45, 0x58,
    ];

    const RAW_S: [u8; 48] = [
        0x5b, 0xe2, 0x9d, 0x18, 0x71, 0x5d, 0xb3, 0xd8, 0x0b, 0x5d, 0xee,
        0x9c, 0x38, 0x79, 0x46, 0x29, 0x90, 0x89, 0xd5, 0x21, 0xb0, 0x82,
        0x45, 0x78, 0x2e, 0xf0, 0x68, 0xa9, 0xfa, 0x76, 0xaa, 0xe2, 0x36,
        0x47, 0xcc, 0x3c, 0x74, 0x2d, 0xfc, 0x6d, 0xa6, 0x72, 0x35, 0x29,
        0xc7, 0x21, 0xcf, 0x5c,
    ];

    const PARAM_R: [u8; 32] = [
        0x2e, 0x79, 0xdd, 0x3e, 0xec, 0x80, 0x8c, 0xd7, 0x0c, 0x22, 0x51,
        0x28, 0xb3, 0xcd, 0x28, 0x8e, 0xc6, 0x24, 0xe1, 0xfc, 0xd7, 0x37,
        0xdb, 0xc1, 0x17, 0xbb, 0x88, 0x63, 0xec, 0x1a, 0x3c, 0x7c,
    ];

    const PARAM_S: [u8; 33] = [
        0x00, 0x8c, 0x40, 0x58, 0x99, 0x53, 0x43, 0x5d, 0xcb, 0x21, 0xf0,
        0x81, 0x6d, 0xd3, 0x02, 0x67, 0x85, 0x8f, 0x4a, 0x34, 0x9c, 0x2a,
        0x21, 0x47, 0xf3, 0x76, 0x48, 0xdf, 0xfe, 0x52, 0x54, 0xf9, 0xa5,
    ];

    const PARAM_RAW: [u8; 71] = [
        0x30, 0x45, 0x02, 0x20, 0x2e, 0x79, 0xdd, 0x3e, 0xec, 0x80, 0x8c,
        0xd7, 0x0c, 0x22, 0x51, 0x28, 0xb3, 0xcd, 0x28, 0x8e, 0xc6, 0x24,
        0xe1, 0xfc, 0xd7, 0x37, 0xdb, 0xc1, 0x17, 0xbb, 0x88, 0x63, 0xec,
        0x1a, 0x3c, 0x7c, 0x02, 0x21, 0x00, 0x8c, 0x40, 0x58, 0x99, 0x53,
        0x43, 0x5d, 0xcb, 0x21, 0xf0, 0x81, 0x6d, 0xd3, 0x02, 0x67, 0x85,
        0x8f, 0x4a, 0x34, 0x9c, 0x2a, 0x21, 0x47, 0xf3, 0x76, 0x48, 0xdf,
        0xfe, 0x52, 0x54, 0xf9, 0xa5,
    ];

    fn assert_malformed(raw: &[u8]) {
        assert_eq!(
            decode(raw).unwrap_err().kind(),
            ErrorKind::MalformedEncoding,
            "{raw:02x?}"
        );
    }

    #[test]
    fn decode_vector() {
        let (r, s) = decode(&RAW).unwrap();
        assert_eq!(r, RAW_R);
        assert_eq!(s, RAW_S);
    }

    #[test]
    fn encode_vector() {
        assert_eq!(encode(&PARAM_R, &PARAM_S).unwrap(), PARAM_RAW);
    }

    #[test]
    fn encode_pads_high_bit() {
        assert_eq!(
            encode(&[0x80], &[0x7f]).unwrap(),
            [0x30, 0x07, 0x02, 0x02, 0x00, 0x80, 0x02, 0x01, 0x7f]
        );
        assert_eq!(
            encode(&[], &[0x01]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn long_form_length() {
        let r = [0x11; 70];
        let s = [0xee; 70];
        let der = encode(&r, &s).unwrap();
        assert_eq!(&der[..3], &[0x30, 0x81, 0x91]);
        assert_eq!(der.len(), 3 + 0x91);
        let (dr, ds) = decode(&der).unwrap();
        assert_eq!(dr, r);
        assert_eq!(&ds[1..], s);
        assert_eq!(ds[0], 0);
    }

    #[test]
    fn round_trip() {
        let mut rng = rand::thread_rng();
        for width in [20, 32, 48, 66] {
            for _ in 0..50 {
                let mut r = vec![0u8; width];
                let mut s = vec![0u8; width];
                rng.fill_bytes(&mut r);
                rng.fill_bytes(&mut s);
                // Minimal magnitudes have no leading zero octet.
                r[0] |= 0x01;
                s[0] |= 0x01;

                let der = encode(&r, &s).unwrap();
                let (dr, ds) = decode(&der).unwrap();
                assert_eq!(to_fixed_width(&dr, width).unwrap(), r);
                assert_eq!(to_fixed_width(&ds, width).unwrap(), s);
                if r[0] & 0x80 == 0 && s[0] & 0x80 == 0 {
                    assert_eq!((dr, ds), (r, s));
                }
            }
        }
    }

    #[test]
    fn malformed() {
        // Empty and truncated headers.
        assert_malformed(&[]);
        assert_malformed(&[0x30]);
        assert_malformed(&[0x30, 0x81]);

        // Wrong outer tag.
        let mut raw = PARAM_RAW;
        raw[0] = 0x31;
        assert_malformed(&raw);

        // Wrong inner tag.
        let mut raw = PARAM_RAW;
        raw[2] = 0x04;
        assert_malformed(&raw);

        // Sequence length larger and smaller than the data.
        let mut raw = PARAM_RAW;
        raw[1] = 0x46;
        assert_malformed(&raw);
        assert_malformed(&PARAM_RAW[..70]);
        let mut raw = PARAM_RAW.to_vec();
        raw.push(0);
        assert_malformed(&raw);

        // Integer length past the end of the sequence.
        let mut raw = PARAM_RAW;
        raw[37] = 0x22;
        assert_malformed(&raw);

        // Three integers.
        assert_malformed(&[
            0x30, 0x09, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x01, 0x03,
        ]);

        // Only one integer.
        assert_malformed(&[0x30, 0x03, 0x02, 0x01, 0x01]);

        // Empty and negative integers.
        assert_malformed(&[0x30, 0x05, 0x02, 0x00, 0x02, 0x01, 0x01]);
        assert_malformed(&[0x30, 0x06, 0x02, 0x01, 0x80, 0x02, 0x01, 0x01]);

        // Integers with redundant leading zeros.
        assert_malformed(&[
            0x30, 0x08, 0x02, 0x02, 0x00, 0x01, 0x02, 0x02, 0x00, 0x01,
        ]);
        assert_malformed(&[
            0x30, 0x0a, 0x02, 0x03, 0x00, 0x00, 0x01, 0x02, 0x03, 0x00, 0x00,
            0x01,
        ]);
        assert_malformed(&[
            0x30, 0x07, 0x02, 0x02, 0x00, 0x01, 0x02, 0x01, 0x01,
        ]);

        // Indefinite and non-minimal lengths.
        assert_malformed(&[0x30, 0x80, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01]);
        assert_malformed(&[
            0x30, 0x81, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x01,
        ]);
    }

    #[test]
    fn fixed_width() {
        assert_eq!(to_fixed_width(&RAW_R, 48).unwrap(), &RAW_R[1..]);
        assert_eq!(to_fixed_width(&RAW_S, 48).unwrap(), RAW_S);
        assert_eq!(to_fixed_width(&[0x01, 0x02], 4).unwrap(), [0, 0, 1, 2]);
        assert_eq!(to_fixed_width(&[0, 0, 0], 2).unwrap(), [0, 0]);
        assert_eq!(
            to_fixed_width(&[1, 2, 3], 2).unwrap_err().kind(),
            ErrorKind::MalformedEncoding
        );
    }

    #[test]
    fn rrsig_conversion() {
        let sig = der_to_rrsig(&RAW, 48).unwrap();
        assert_eq!(sig.len(), 96);
        assert_eq!(&sig[..48], &RAW_R[1..]);
        assert_eq!(&sig[48..], RAW_S);
        assert_eq!(rrsig_to_der(&sig).unwrap(), RAW);

        let mut sig = [0u8; 64];
        sig[31] = 0x05;
        sig[32] = 0xff;
        assert_eq!(
            rrsig_to_der(&sig).unwrap()[..7],
            [0x30, 0x26, 0x02, 0x01, 0x05, 0x02, 0x21]
        );
        assert_eq!(der_to_rrsig(&rrsig_to_der(&sig).unwrap(), 32).unwrap(), sig);

        let zero = [0u8; 64];
        assert_eq!(
            rrsig_to_der(&zero).unwrap(),
            [0x30, 0x06, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00]
        );
        assert!(rrsig_to_der(&[0; 63]).is_err());
        assert!(der_to_rrsig(&RAW, 32).is_err());
    }
}
