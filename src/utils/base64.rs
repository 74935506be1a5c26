//! Encoding of Base 64.
//!
//! The Base 64 encoding is defined in [RFC 4648]. Only the original
//! *base64* variant is implemented since this is what both the DNS
//! presentation format and PEM use. Decoding PEM is left to
//! `rustls-pemfile`.
//!
//! [RFC 4648]: https://tools.ietf.org/html/rfc4648

use core::fmt;
use std::string::String;

//------------ Convenience Functions -----------------------------------------

/// Encodes binary data in *base64* and writes it into a format stream.
pub fn display<B, W>(bytes: &B, f: &mut W) -> fmt::Result
where
    B: AsRef<[u8]> + ?Sized,
    W: fmt::Write,
{
    fn ch(i: u8) -> char {
        ENCODE_ALPHABET[i as usize]
    }

    for chunk in bytes.as_ref().chunks(3) {
        match *chunk {
            [a] => {
                f.write_char(ch(a >> 2))?;
                f.write_char(ch((a & 0x03) << 4))?;
                f.write_char(PAD)?;
                f.write_char(PAD)?;
            }
            [a, b] => {
                f.write_char(ch(a >> 2))?;
                f.write_char(ch((a & 0x03) << 4 | b >> 4))?;
                f.write_char(ch((b & 0x0F) << 2))?;
                f.write_char(PAD)?;
            }
            [a, b, c] => {
                f.write_char(ch(a >> 2))?;
                f.write_char(ch((a & 0x03) << 4 | b >> 4))?;
                f.write_char(ch((b & 0x0F) << 2 | c >> 6))?;
                f.write_char(ch(c & 0x3F))?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Encodes binary data in *base64* broken into lines.
///
/// Each line holds at most `width` characters, rounded down to a multiple
/// of four, and is terminated by a line feed.
pub fn encode_wrapped<B: AsRef<[u8]> + ?Sized>(
    bytes: &B,
    width: usize,
) -> String {
    let per_line = (width / 4).max(1) * 3;
    let mut res = String::new();
    for line in bytes.as_ref().chunks(per_line) {
        // Writing into a string cannot fail.
        let _ = display(line, &mut res);
        res.push('\n');
    }
    res
}

//============ Constants =====================================================

const ENCODE_ALPHABET: [char; 64] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', // 0x00 .. 0x07
    'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', // 0x08 .. 0x0F
    'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', // 0x10 .. 0x17
    'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', // 0x18 .. 0x1F
    'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', // 0x20 .. 0x27
    'o', 'p', 'q', 'r', 's', 't', 'u', 'v', // 0x28 .. 0x2F
    'w', 'x', 'y', 'z', '0', '1', '2', '3', // 0x30 .. 0x37
    '4', '5', '6', '7', '8', '9', '+', '/', // 0x38 .. 0x3F
];

/// The padding character
const PAD: char = '=';

//============ Test ==========================================================
