//! Key and signature policy.
//!
//! A [`KeyPolicy`] collects the parameters a signer needs to create keys
//! and signatures for a zone. It is a plain value: build it with
//! [`KeyPolicy::new`] and the `with_*` methods, then call
//! [`resolve`][KeyPolicy::resolve] to check it and fill in default key
//! sizes before using it.
//!
//! Loading and saving policies from and to files is not supported yet.

use std::path::Path;
use std::time::Duration;

use crate::base::iana::SecurityAlgorithm;
use crate::crypto::common::{check_key_size, default_key_size};
use crate::error::Error;

//----------- KeyPolicy ------------------------------------------------------

/// Parameters for keys and signatures of a zone.
///
/// All durations are in seconds.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "kebab-case")
)]
pub struct KeyPolicy {
    /// The algorithm of new keys.
    pub algorithm: SecurityAlgorithm,

    /// The size of new key signing keys in bits.
    ///
    /// Zero selects the default size for the algorithm.
    pub ksk_size: u32,

    /// The size of new zone signing keys in bits.
    ///
    /// Zero selects the default size for the algorithm.
    pub zsk_size: u32,

    /// The TTL of the DNSKEY record set.
    pub dnskey_ttl: u32,

    /// How long a zone signing key is used before it is rolled over.
    pub zsk_lifetime: u32,

    /// The validity period of new signatures.
    pub rrsig_lifetime: u32,

    /// How long before expiration signatures are refreshed.
    pub rrsig_refresh_before: u32,

    /// The time it takes for a change to reach all secondaries.
    pub propagation_delay: u32,

    /// Whether the zone is signed with NSEC3 rather than NSEC.
    pub nsec3: bool,
}

impl KeyPolicy {
    /// Creates a policy with the default parameters.
    pub fn new() -> Self {
        KeyPolicy {
            algorithm: SecurityAlgorithm::ECDSAP256SHA256,
            ksk_size: 256,
            zsk_size: 256,
            dnskey_ttl: 1200,
            zsk_lifetime: 30 * 24 * 60 * 60,
            rrsig_lifetime: 14 * 24 * 60 * 60,
            rrsig_refresh_before: 7 * 24 * 60 * 60,
            propagation_delay: 60 * 60,
            nsec3: false,
        }
    }

    /// Sets the algorithm and resets both key sizes to its default.
    pub fn with_algorithm(mut self, algorithm: SecurityAlgorithm) -> Self {
        self.algorithm = algorithm;
        let size = default_key_size(algorithm).unwrap_or(0);
        self.ksk_size = size;
        self.zsk_size = size;
        self
    }

    pub fn with_ksk_size(mut self, bits: u32) -> Self {
        self.ksk_size = bits;
        self
    }

    pub fn with_zsk_size(mut self, bits: u32) -> Self {
        self.zsk_size = bits;
        self
    }

    pub fn with_dnskey_ttl(
        mut self,
        ttl: Duration,
    ) -> Result<Self, Error> {
        self.dnskey_ttl = secs(ttl)?;
        Ok(self)
    }

    pub fn with_zsk_lifetime(
        mut self,
        lifetime: Duration,
    ) -> Result<Self, Error> {
        self.zsk_lifetime = secs(lifetime)?;
        Ok(self)
    }

    pub fn with_rrsig_lifetime(
        mut self,
        lifetime: Duration,
    ) -> Result<Self, Error> {
        self.rrsig_lifetime = secs(lifetime)?;
        Ok(self)
    }

    pub fn with_rrsig_refresh_before(
        mut self,
        refresh: Duration,
    ) -> Result<Self, Error> {
        self.rrsig_refresh_before = secs(refresh)?;
        Ok(self)
    }

    pub fn with_propagation_delay(
        mut self,
        delay: Duration,
    ) -> Result<Self, Error> {
        self.propagation_delay = secs(delay)?;
        Ok(self)
    }

    pub fn with_nsec3(mut self, nsec3: bool) -> Self {
        self.nsec3 = nsec3;
        self
    }

    pub fn dnskey_ttl(&self) -> Duration {
        Duration::from_secs(self.dnskey_ttl.into())
    }

    pub fn zsk_lifetime(&self) -> Duration {
        Duration::from_secs(self.zsk_lifetime.into())
    }

    pub fn rrsig_lifetime(&self) -> Duration {
        Duration::from_secs(self.rrsig_lifetime.into())
    }

    pub fn rrsig_refresh_before(&self) -> Duration {
        Duration::from_secs(self.rrsig_refresh_before.into())
    }

    pub fn propagation_delay(&self) -> Duration {
        Duration::from_secs(self.propagation_delay.into())
    }

    /// Checks the policy and fills in default key sizes.
    ///
    /// Key sizes of zero are replaced by the default for the algorithm and
    /// fixed size algorithms get their only size.
    pub fn resolve(mut self) -> Result<Self, Error> {
        self.ksk_size = self.resolve_size(self.ksk_size)?;
        self.zsk_size = self.resolve_size(self.zsk_size)?;
        if self.rrsig_lifetime == 0 {
            return Err(Error::InvalidArgument("zero signature lifetime"));
        }
        if self.rrsig_refresh_before >= self.rrsig_lifetime {
            return Err(Error::InvalidArgument(
                "signature refresh must be shorter than its lifetime",
            ));
        }
        Ok(self)
    }

    fn resolve_size(&self, bits: u32) -> Result<u32, Error> {
        let bits = match bits {
            0 => default_key_size(self.algorithm)
                .ok_or(Error::UnsupportedAlgorithm(self.algorithm))?,
            bits => bits,
        };
        check_key_size(self.algorithm, bits)
    }

    /// Loads a policy from a file.
    ///
    /// This is not implemented and always fails.
    pub fn load(_path: impl AsRef<Path>) -> Result<Self, Error> {
        Err(Error::NotImplemented)
    }

    /// Saves the policy to a file.
    ///
    /// This is not implemented and always fails.
    pub fn save(&self, _path: impl AsRef<Path>) -> Result<(), Error> {
        Err(Error::NotImplemented)
    }
}

//--- Default

impl Default for KeyPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a duration into whole seconds.
///
/// Sub-second parts are dropped. Durations that don't fit into 32 bits are
/// rejected.
fn secs(duration: Duration) -> Result<u32, Error> {
    u32::try_from(duration.as_secs())
        .map_err(|_| Error::InvalidArgument("duration too long"))
}

//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let policy = KeyPolicy::default();
        assert_eq!(policy.algorithm, SecurityAlgorithm::ECDSAP256SHA256);
        assert_eq!(policy.ksk_size, 256);
        assert_eq!(policy.zsk_size, 256);
        assert_eq!(policy.dnskey_ttl(), Duration::from_secs(1200));
        assert_eq!(policy.zsk_lifetime(), Duration::from_secs(2_592_000));
        assert_eq!(policy.rrsig_lifetime(), Duration::from_secs(1_209_600));
        assert_eq!(
            policy.rrsig_refresh_before(),
            Duration::from_secs(604_800)
        );
        assert_eq!(policy.propagation_delay(), Duration::from_secs(3600));
        assert!(!policy.nsec3);
        assert_eq!(policy.clone().resolve(), Ok(policy));
    }

    #[test]
    fn builder() {
        let policy = KeyPolicy::new()
            .with_algorithm(SecurityAlgorithm::RSASHA256)
            .with_ksk_size(4096)
            .with_dnskey_ttl(Duration::from_secs(3600))
            .unwrap()
            .with_nsec3(true);
        assert_eq!(policy.ksk_size, 4096);
        assert_eq!(policy.zsk_size, 2048);
        assert_eq!(policy.dnskey_ttl, 3600);
        assert!(policy.nsec3);
    }

    #[test]
    fn long_durations() {
        let max = Duration::from_secs(u32::MAX.into());
        let policy = KeyPolicy::new().with_zsk_lifetime(max).unwrap();
        assert_eq!(policy.zsk_lifetime(), max);

        let too_long = max + Duration::from_secs(1);
        let policy = KeyPolicy::new();
        for res in [
            policy.clone().with_dnskey_ttl(too_long),
            policy.clone().with_zsk_lifetime(too_long),
            policy.clone().with_rrsig_lifetime(too_long),
            policy.clone().with_rrsig_refresh_before(too_long),
            policy.clone().with_propagation_delay(too_long),
        ] {
            assert_eq!(res, Err(Error::InvalidArgument("duration too long")));
        }
    }

    #[test]
    fn resolve() {
        let policy = KeyPolicy::new()
            .with_algorithm(SecurityAlgorithm::RSASHA256)
            .with_zsk_size(0)
            .resolve()
            .unwrap();
        assert_eq!(policy.zsk_size, 2048);

        let policy = KeyPolicy::new()
            .with_algorithm(SecurityAlgorithm::ED25519)
            .with_ksk_size(0)
            .resolve()
            .unwrap();
        assert_eq!(policy.ksk_size, 256);

        assert_eq!(
            KeyPolicy::new()
                .with_algorithm(SecurityAlgorithm::RSASHA256)
                .with_ksk_size(1024)
                .resolve()
                .unwrap_err()
                .kind(),
            crate::error::ErrorKind::InvalidKeySize
        );
        assert_eq!(
            KeyPolicy::new()
                .with_algorithm(SecurityAlgorithm::DSA)
                .resolve(),
            Err(Error::UnsupportedAlgorithm(SecurityAlgorithm::DSA))
        );
        assert!(KeyPolicy::new()
            .with_rrsig_refresh_before(Duration::from_secs(14 * 86400))
            .unwrap()
            .resolve()
            .is_err());
    }

    #[test]
    fn files_not_implemented() {
        assert_eq!(
            KeyPolicy::load("policy.json"),
            Err(Error::NotImplemented)
        );
        assert_eq!(
            KeyPolicy::new().save("policy.json"),
            Err(Error::NotImplemented)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn ser_de() {
        use serde_test::{assert_de_tokens, assert_tokens, Configure, Token};

        let policy = KeyPolicy::new().with_nsec3(true);
        assert_tokens(
            &policy.clone().readable(),
            &[
                Token::Struct {
                    name: "KeyPolicy",
                    len: 9,
                },
                Token::Str("algorithm"),
                Token::Str("ECDSAP256SHA256"),
                Token::Str("ksk-size"),
                Token::U32(256),
                Token::Str("zsk-size"),
                Token::U32(256),
                Token::Str("dnskey-ttl"),
                Token::U32(1200),
                Token::Str("zsk-lifetime"),
                Token::U32(2_592_000),
                Token::Str("rrsig-lifetime"),
                Token::U32(1_209_600),
                Token::Str("rrsig-refresh-before"),
                Token::U32(604_800),
                Token::Str("propagation-delay"),
                Token::U32(3600),
                Token::Str("nsec3"),
                Token::Bool(true),
                Token::StructEnd,
            ],
        );

        // Missing fields take their default.
        assert_de_tokens(
            &KeyPolicy::new()
                .with_algorithm(SecurityAlgorithm::ED25519)
                .readable(),
            &[
                Token::Struct {
                    name: "KeyPolicy",
                    len: 1,
                },
                Token::Str("algorithm"),
                Token::Str("ED25519"),
                Token::Str("ksk-size"),
                Token::U32(256),
                Token::Str("zsk-size"),
                Token::U32(256),
                Token::StructEnd,
            ],
        );
    }
}
