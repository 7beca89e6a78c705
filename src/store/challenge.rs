//! In-flight challenge store.
//!
//! At most one live challenge per subject. Challenges are never removed by
//! time alone: an expired entry is found and purged on its next read.

use crate::crypto::digest::HashDigest;
use crate::SubjectId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// A hashed one-time secret bound to a subject and an issue time.
#[derive(Debug, Clone)]
pub struct Challenge {
    /// Digest of the secret; the plaintext is never stored.
    pub hashed_secret: HashDigest,

    /// When the challenge was issued.
    pub issued_at: DateTime<Utc>,
}

/// Per-subject challenge map.
#[derive(Debug, Default)]
pub struct ChallengeStore {
    entries: HashMap<SubjectId, Challenge>,
}

impl ChallengeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a challenge, superseding any earlier one for the subject.
    pub fn put(&mut self, subject: &SubjectId, hashed_secret: HashDigest, issued_at: DateTime<Utc>) {
        self.entries.insert(
            subject.clone(),
            Challenge {
                hashed_secret,
                issued_at,
            },
        );
    }

    /// Remove and return the subject's challenge digest if it is still fresh.
    ///
    /// The entry is removed whether or not it is fresh, so a challenge can
    /// be attempted once at most. A challenge aged exactly `ttl` is fresh.
    pub fn take_if_fresh(
        &mut self,
        subject: &SubjectId,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<HashDigest> {
        let challenge = self.entries.remove(subject)?;

        if now.signed_duration_since(challenge.issued_at) > ttl {
            tracing::debug!(subject = %subject, "Challenge expired");
            return None;
        }

        Some(challenge.hashed_secret)
    }

    /// Whether the subject has a stored challenge, fresh or not.
    #[cfg(test)]
    pub(crate) fn contains(&self, subject: &SubjectId) -> bool {
        self.entries.contains_key(subject)
    }

    /// Number of stored challenges.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::digest::hash_secret;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_take_missing() {
        let mut store = ChallengeStore::new();
        let subject = SubjectId::from("1");
        assert!(store
            .take_if_fresh(&subject, Duration::seconds(120), t0())
            .is_none());
    }

    #[test]
    fn test_take_fresh_removes_entry() {
        let mut store = ChallengeStore::new();
        let subject = SubjectId::from("1");
        store.put(&subject, hash_secret("s"), t0());

        let taken = store.take_if_fresh(&subject, Duration::seconds(120), t0() + Duration::seconds(5));
        assert!(taken.unwrap().ct_eq(&hash_secret("s")));
        assert!(!store.contains(&subject));

        let again = store.take_if_fresh(&subject, Duration::seconds(120), t0() + Duration::seconds(6));
        assert!(again.is_none());
    }

    #[test]
    fn test_ttl_boundary_is_fresh() {
        let mut store = ChallengeStore::new();
        let subject = SubjectId::from("1");
        store.put(&subject, hash_secret("s"), t0());

        let taken = store.take_if_fresh(&subject, Duration::seconds(120), t0() + Duration::seconds(120));
        assert!(taken.is_some());
    }

    #[test]
    fn test_expired_is_purged() {
        let mut store = ChallengeStore::new();
        let subject = SubjectId::from("1");
        store.put(&subject, hash_secret("s"), t0());

        let taken = store.take_if_fresh(&subject, Duration::seconds(120), t0() + Duration::seconds(121));
        assert!(taken.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_supersedes() {
        let mut store = ChallengeStore::new();
        let subject = SubjectId::from("1");
        store.put(&subject, hash_secret("old"), t0());
        store.put(&subject, hash_secret("new"), t0());
        assert_eq!(store.len(), 1);

        let taken = store
            .take_if_fresh(&subject, Duration::seconds(120), t0())
            .unwrap();
        assert!(taken.ct_eq(&hash_secret("new")));
        assert!(!taken.ct_eq(&hash_secret("old")));
    }

    #[test]
    fn test_subjects_are_independent() {
        let mut store = ChallengeStore::new();
        store.put(&SubjectId::from("1"), hash_secret("a"), t0());
        store.put(&SubjectId::from("2"), hash_secret("b"), t0());

        store.take_if_fresh(&SubjectId::from("1"), Duration::seconds(120), t0());
        assert!(store.contains(&SubjectId::from("2")));
    }
}
