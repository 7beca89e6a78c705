//! One-time secret generation.

use crate::crypto::digest::{hash_secret, HashDigest};
use crate::GateError;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Random bytes per secret (128 bits of entropy).
pub const SECRET_BYTES: usize = 16;

/// Plaintext one-time secret.
///
/// Only ever handed to the display surface. `Debug` is redacted so the
/// value cannot leak through logs by accident.
#[derive(Clone)]
pub struct PlaintextSecret(String);

impl PlaintextSecret {
    /// The secret text, for display on the console.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Consume the secret and return its text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Digest of this secret.
    pub fn digest(&self) -> HashDigest {
        hash_secret(&self.0)
    }
}

impl fmt::Debug for PlaintextSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PlaintextSecret(<redacted>)")
    }
}

/// Generate a fresh secret from the operating system CSPRNG.
///
/// The secret is `SECRET_BYTES` random bytes in URL-safe base64 without
/// padding (22 characters).
pub fn generate() -> Result<PlaintextSecret, GateError> {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| GateError::EntropyUnavailable(e.to_string()))?;
    Ok(PlaintextSecret(URL_SAFE_NO_PAD.encode(bytes)))
}

/// Digest of a submitted candidate.
///
/// Surrounding whitespace is dropped first; pasted codes often carry a
/// trailing newline.
pub fn hash_candidate(candidate: &str) -> HashDigest {
    hash_secret(candidate.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_length_and_alphabet() {
        let secret = generate().unwrap();
        assert_eq!(secret.expose().len(), 22);
        assert!(secret
            .expose()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_generate_decodes_to_16_bytes() {
        let secret = generate().unwrap();
        let decoded = URL_SAFE_NO_PAD.decode(secret.expose()).unwrap();
        assert_eq!(decoded.len(), SECRET_BYTES);
    }

    #[test]
    fn test_generate_is_unique() {
        let secrets: HashSet<String> = (0..100).map(|_| generate().unwrap().into_string()).collect();
        assert_eq!(secrets.len(), 100);
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = generate().unwrap();
        let rendered = format!("{:?}", secret);
        assert_eq!(rendered, "PlaintextSecret(<redacted>)");
        assert!(!rendered.contains(secret.expose()));
    }

    #[test]
    fn test_candidate_is_trimmed() {
        let secret = generate().unwrap();
        let padded = format!("  {}\n", secret.expose());
        assert!(hash_candidate(&padded).ct_eq(&secret.digest()));
    }

    #[test]
    fn test_candidate_inner_whitespace_kept() {
        assert!(!hash_candidate("ab cd").ct_eq(&hash_secret("abcd")));
    }
}
