//! Phone number fingerprints.

use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a rendered fingerprint: 32 bytes of SHA-256 as hex.
pub const FINGERPRINT_LEN: usize = 64;

/// Lowercase hex SHA-256 digest of a phone number.
///
/// Deterministic and total: every string, including the empty one, has
/// exactly one fingerprint, so a later verification step can recompute it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a phone number.
    pub fn of(phone_number: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(phone_number.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
