//! Helpers shared by the integration tests.

use std::fs;
use std::path::PathBuf;

pub use dnssec_keystore::logging::init_logging;

/// Reads a PEM file from the test data.
#[allow(dead_code)]
pub fn read_key(name: &str) -> Vec<u8> {
    let path: PathBuf =
        [env!("CARGO_MANIFEST_DIR"), "test-data", "keys", name]
            .iter()
            .collect();
    fs::read(&path)
        .unwrap_or_else(|err| panic!("cannot read {}: {err}", path.display()))
}

/// A key from the test data with its known properties.
#[allow(dead_code)]
pub struct KnownKey {
    /// The file name under test-data/keys.
    pub file: &'static str,

    /// The algorithm to use the key with.
    pub algorithm: dnssec_keystore::base::iana::SecurityAlgorithm,

    /// The key id.
    pub id: &'static str,

    /// The key tag with KSK flags.
    pub ksk_tag: u16,

    /// The SHA-256 DS digest for example.com. with KSK flags.
    pub ds_sha256: &'static str,
}

#[allow(dead_code)]
pub const KNOWN_KEYS: &[KnownKey] = {
    use dnssec_keystore::base::iana::SecurityAlgorithm;

    &[
        KnownKey {
            file: "rsa2048.pem",
            algorithm: SecurityAlgorithm::RSASHA256,
            id: "0eb2ba1b78f53400b28574a2dddf08ef96770a12",
            ksk_tag: 21995,
            ds_sha256: "de62cd3994898817f36c11cdcaac46f10fcedb97b951c7d5a79573b1ba4279ca",
        },
        KnownKey {
            file: "ecdsa-p256.pem",
            algorithm: SecurityAlgorithm::ECDSAP256SHA256,
            id: "2e2ae04b5fd8fef5a14487fb4d765ee34ba92f00",
            ksk_tag: 46357,
            ds_sha256: "a98f4a9dc6664672429e42f323560e4b298de67fd69c5538e07ac1dcf4876dba",
        },
        KnownKey {
            file: "ecdsa-p384.pem",
            algorithm: SecurityAlgorithm::ECDSAP384SHA384,
            id: "c017af53d28ce77c21697446affdae212401b08f",
            ksk_tag: 26714,
            ds_sha256: "9779fb4e6e89098fa11424eb24a0a1f7d4597568a4d916b80a81c4b8245bc839",
        },
        KnownKey {
            file: "ed25519.pem",
            algorithm: SecurityAlgorithm::ED25519,
            id: "797b53e0e42b92974eeae16efbbf4b0147f26a45",
            ksk_tag: 54566,
            ds_sha256: "e7b1f665bd8d3a21bac9f87ad2bb41c9f147fc59875b22492a3e86a18b39dd41",
        },
    ]
};
