//! SHA-256 digests of one-time secrets.

use crate::crypto::compare::constant_time_eq;
use sha2::{Digest, Sha256};
use std::fmt;

/// Length of a secret digest in bytes (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// One-way digest of a secret.
///
/// Deliberately not `PartialEq`: digests are compared with
/// [`HashDigest::ct_eq`] only.
#[derive(Clone)]
pub struct HashDigest([u8; DIGEST_LEN]);

impl HashDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex encoding of the full digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex prefix, safe to put in logs.
    pub fn fingerprint(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(8);
        hex
    }

    /// Compare two digests in constant time.
    pub fn ct_eq(&self, other: &HashDigest) -> bool {
        constant_time_eq(self.as_bytes(), other.as_bytes())
    }
}

impl fmt::Debug for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashDigest({}..)", self.fingerprint())
    }
}

/// Compute the SHA-256 digest of a secret.
///
/// No salt: every secret is single-use and carries 128 bits of entropy.
pub fn hash_secret(secret: &str) -> HashDigest {
    let hash = Sha256::digest(secret.as_bytes());
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&hash);
    HashDigest::from_bytes(bytes)
}
