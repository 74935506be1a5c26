//! Record data from [RFC 4034]: DS and DNSKEY records.
//!
//! [RFC 4034]: https://tools.ietf.org/html/rfc4034

use core::fmt;
use std::vec::Vec;

use octseq::builder::OctetsBuilder;
use octseq::octets::Octets;
use octseq::parse::Parser;

use crate::base::iana::{DigestAlgorithm, SecurityAlgorithm};
use crate::crypto::common::DigestType;
use crate::crypto::ring::DigestBuilder;
use crate::error::Error;
use crate::utils::{base16, base64};

/// The longest record data that fits into a resource record.
const MAX_RDATA_LEN: usize = 0xFFFF;

//------------ Dnskey --------------------------------------------------------

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Dnskey<Octs> {
    flags: u16,
    protocol: u8,
    algorithm: SecurityAlgorithm,
    public_key: Octs,
}

impl Dnskey<()> {
    /// The only protocol value allowed by [RFC 4034, Section 2.1.2].
    ///
    /// [RFC 4034, Section 2.1.2]: https://tools.ietf.org/html/rfc4034#section-2.1.2
    pub const PROTOCOL: u8 = 3;

    /// The Zone Key flag.
    pub const ZONE_KEY: u16 = 0b0000_0001_0000_0000;

    /// The Revoke flag from [RFC 5011].
    ///
    /// [RFC 5011]: https://tools.ietf.org/html/rfc5011
    pub const REVOKE: u16 = 0b0000_0000_1000_0000;

    /// The Secure Entry Point flag.
    pub const SECURE_ENTRY_POINT: u16 = 0b0000_0000_0000_0001;

    /// The flags of a key signing key.
    pub const KSK_FLAGS: u16 = Self::ZONE_KEY | Self::SECURE_ENTRY_POINT;

    /// The flags of a zone signing key.
    pub const ZSK_FLAGS: u16 = Self::ZONE_KEY;
}

impl<Octs> Dnskey<Octs> {
    pub fn new(
        flags: u16,
        protocol: u8,
        algorithm: SecurityAlgorithm,
        public_key: Octs,
    ) -> Result<Self, Error>
    where
        Octs: AsRef<[u8]>,
    {
        if public_key.as_ref().len() > MAX_RDATA_LEN - 4 {
            return Err(Error::InvalidArgument("DNSKEY record data too long"));
        }
        Ok(Dnskey {
            flags,
            protocol,
            algorithm,
            public_key,
        })
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn algorithm(&self) -> SecurityAlgorithm {
        self.algorithm
    }

    pub fn public_key(&self) -> &Octs {
        &self.public_key
    }

    pub fn into_public_key(self) -> Octs {
        self.public_key
    }

    /// Returns whether the Revoke flag is set.
    ///
    /// See [RFC 5011, Section 3].
    ///
    /// [RFC 5011, Section 3]: https://tools.ietf.org/html/rfc5011#section-3
    pub fn is_revoked(&self) -> bool {
        self.flags() & Dnskey::REVOKE != 0
    }

    /// Returns whether the the Secure Entry Point (SEP) flag is set.
    ///
    /// See [RFC 4034, Section 2.1.1]:
    ///
    /// > This flag is only intended to be a hint to zone signing or
    /// > debugging software as to the intended use of this DNSKEY record;
    /// > validators MUST NOT alter their behavior during the signature
    /// > validation process in any way based on the setting of this bit.
    ///
    /// [RFC 4034, Section 2.1.1]: https://tools.ietf.org/html/rfc4034#section-2.1.1
    pub fn is_secure_entry_point(&self) -> bool {
        self.flags() & Dnskey::SECURE_ENTRY_POINT != 0
    }

    /// Returns whether the Zone Key flag is set.
    ///
    /// If the flag is not set, the key MUST NOT be used to verify RRSIGs that
    /// cover RRSETs. See [RFC 4034, Section 2.1.1].
    ///
    /// [RFC 4034, Section 2.1.1]: https://tools.ietf.org/html/rfc4034#section-2.1.1
    pub fn is_zone_key(&self) -> bool {
        self.flags() & Dnskey::ZONE_KEY != 0
    }

    /// Returns the key tag for this DNSKEY data.
    ///
    /// This is the algorithm from [RFC 4034, Appendix B].
    ///
    /// [RFC 4034, Appendix B]: https://tools.ietf.org/html/rfc4034#appendix-B
    pub fn key_tag(&self) -> u16
    where
        Octs: AsRef<[u8]>,
    {
        let key = self.public_key.as_ref();
        if self.algorithm == SecurityAlgorithm::RSAMD5 {
            // The key tag is third-to-last and second-to-last octets of the
            // key as a big-endian u16. If we don’t have enough octets in the
            // key, we return 0.
            let len = key.len();
            if len > 2 {
                u16::from_be_bytes([key[len - 3], key[len - 2]])
            } else {
                0
            }
        } else {
            // Treat record data as a octet sequence. Add octets at odd
            // indexes as they are, add octets at even indexes shifted left
            // by 8 bits.
            let mut res = u32::from(self.flags);
            res += u32::from(self.protocol) << 8;
            res += u32::from(self.algorithm.to_int());
            for pair in key.chunks(2) {
                res += u32::from(pair[0]) << 8;
                if let Some(&low) = pair.get(1) {
                    res += u32::from(low);
                }
            }

            res += (res >> 16) & 0xFFFF;
            (res & 0xFFFF) as u16
        }
    }

    /// Parses DNSKEY record data.
    ///
    /// The public key takes up the rest of the parser.
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, Error> {
        if parser.remaining() < 4 {
            return Err(Error::MalformedEncoding("short DNSKEY record data"));
        }
        let flags = parser.parse_u16_be()?;
        let protocol = parser.parse_u8()?;
        let algorithm = SecurityAlgorithm::parse(parser)?;
        let public_key = parser.parse_octets(parser.remaining())?;
        Ok(Dnskey {
            flags,
            protocol,
            algorithm,
            public_key,
        })
    }

    /// Appends the wire format record data to `target`.
    pub fn compose<Target: OctetsBuilder + ?Sized>(
        &self,
        target: &mut Target,
    ) -> Result<(), Target::AppendError>
    where
        Octs: AsRef<[u8]>,
    {
        target.append_slice(&self.flags.to_be_bytes())?;
        target.append_slice(&[self.protocol, self.algorithm.to_int()])?;
        target.append_slice(self.public_key.as_ref())
    }

    /// Returns the wire format record data.
    pub fn to_rdata(&self) -> Vec<u8>
    where
        Octs: AsRef<[u8]>,
    {
        let mut res = Vec::with_capacity(4 + self.public_key.as_ref().len());
        if let Err(never) = self.compose(&mut res) {
            match never {}
        }
        res
    }
}

impl Dnskey<Vec<u8>> {
    /// Parses DNSKEY record data from a slice into an owned value.
    pub fn from_rdata(rdata: &[u8]) -> Result<Self, Error> {
        let parsed = Dnskey::parse(&mut Parser::from_ref(rdata))?;
        Ok(Dnskey {
            flags: parsed.flags,
            protocol: parsed.protocol,
            algorithm: parsed.algorithm,
            public_key: parsed.public_key.to_vec(),
        })
    }
}

//--- Display

impl<Octs: AsRef<[u8]>> fmt::Display for Dnskey<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {} ", self.flags, self.protocol, self.algorithm)?;
        base64::display(&self.public_key, f)
    }
}

//------------ Ds -----------------------------------------------------------

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Ds<Octs> {
    key_tag: u16,
    algorithm: SecurityAlgorithm,
    digest_type: DigestAlgorithm,
    digest: Octs,
}

impl<Octs> Ds<Octs> {
    pub fn new(
        key_tag: u16,
        algorithm: SecurityAlgorithm,
        digest_type: DigestAlgorithm,
        digest: Octs,
    ) -> Result<Self, Error>
    where
        Octs: AsRef<[u8]>,
    {
        if digest.as_ref().len() > MAX_RDATA_LEN - 4 {
            return Err(Error::InvalidArgument("DS record data too long"));
        }
        Ok(Ds {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }

    pub fn key_tag(&self) -> u16 {
        self.key_tag
    }

    pub fn algorithm(&self) -> SecurityAlgorithm {
        self.algorithm
    }

    pub fn digest_type(&self) -> DigestAlgorithm {
        self.digest_type
    }

    pub fn digest(&self) -> &Octs {
        &self.digest
    }

    pub fn into_digest(self) -> Octs {
        self.digest
    }

    /// Parses DS record data.
    pub fn parse<'a, Src: Octets<Range<'a> = Octs> + ?Sized>(
        parser: &mut Parser<'a, Src>,
    ) -> Result<Self, Error> {
        if parser.remaining() < 4 {
            return Err(Error::MalformedEncoding("short DS record data"));
        }
        let key_tag = parser.parse_u16_be()?;
        let algorithm = SecurityAlgorithm::parse(parser)?;
        let digest_type = DigestAlgorithm::parse(parser)?;
        let digest = parser.parse_octets(parser.remaining())?;
        Ok(Ds {
            key_tag,
            algorithm,
            digest_type,
            digest,
        })
    }

    /// Appends the wire format record data to `target`.
    pub fn compose<Target: OctetsBuilder + ?Sized>(
        &self,
        target: &mut Target,
    ) -> Result<(), Target::AppendError>
    where
        Octs: AsRef<[u8]>,
    {
        target.append_slice(&self.key_tag.to_be_bytes())?;
        target.append_slice(&[
            self.algorithm.to_int(),
            self.digest_type.to_int(),
        ])?;
        target.append_slice(self.digest.as_ref())
    }
}

impl Ds<Vec<u8>> {
    /// Creates the DS record data for a DNSKEY.
    ///
    /// The digest is computed over the canonical wire format of `owner`
    /// followed by the DNSKEY record data as described in
    /// [RFC 4034, Section 5.1.4]. The owner is given in presentation format
    /// and is treated as absolute. Escape sequences are not supported.
    ///
    /// [RFC 4034, Section 5.1.4]: https://tools.ietf.org/html/rfc4034#section-5.1.4
    pub fn from_dnskey<Octs: AsRef<[u8]>>(
        owner: &str,
        dnskey: &Dnskey<Octs>,
        digest_type: DigestAlgorithm,
    ) -> Result<Self, Error> {
        let mut builder = DigestBuilder::new(DigestType::try_from(digest_type)?);
        builder.update(&owner_to_wire(owner)?);
        builder.update(&dnskey.to_rdata());
        Ds::new(
            dnskey.key_tag(),
            dnskey.algorithm(),
            digest_type,
            builder.finish().as_ref().to_vec(),
        )
    }

    /// Parses DS record data from a slice into an owned value.
    pub fn from_rdata(rdata: &[u8]) -> Result<Self, Error> {
        let parsed = Ds::parse(&mut Parser::from_ref(rdata))?;
        Ok(Ds {
            key_tag: parsed.key_tag,
            algorithm: parsed.algorithm,
            digest_type: parsed.digest_type,
            digest: parsed.digest.to_vec(),
        })
    }
}

//--- Display

impl<Octs: AsRef<[u8]>> fmt::Display for Ds<Octs> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} ",
            self.key_tag, self.algorithm, self.digest_type
        )?;
        base16::display(&self.digest, f)
    }
}

//------------ Helper Functions ----------------------------------------------

/// Converts a domain name to canonical (lowercase) wire format.
fn owner_to_wire(name: &str) -> Result<Vec<u8>, Error> {
    let name = name.strip_suffix('.').unwrap_or(name);
    let mut res = Vec::with_capacity(name.len() + 2);
    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() || label.len() > 63 {
                return Err(Error::InvalidArgument("invalid owner name label"));
            }
            res.push(label.len() as u8);
            res.extend(label.bytes().map(|ch| ch.to_ascii_lowercase()));
        }
    }
    res.push(0);
    if res.len() > 255 {
        return Err(Error::InvalidArgument("owner name too long"));
    }
    Ok(res)
}

//============ Test ==========================================================
