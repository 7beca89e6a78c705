//! Per-subject failure counting and lockout windows.
//!
//! After `max_failed_attempts` consecutive failures a subject is locked for
//! `lockout_duration`. Expired locks are evaluated lazily: the entry is
//! dropped the next time it is looked at, there is no sweeper.

use crate::SubjectId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Failure bookkeeping for one subject.
#[derive(Debug, Clone, Default)]
pub struct LockoutEntry {
    /// Consecutive failures since the last reset.
    pub failure_count: u32,

    /// End of the lock window, set once when the threshold is crossed.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Result of a lockout lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    /// Subject may attempt authorization.
    Unlocked,
    /// Subject is inside a lock window.
    Locked {
        /// Seconds until the window ends, rounded up, never zero.
        remaining_seconds: u64,
    },
}

impl LockStatus {
    /// Whether the subject is locked.
    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        matches!(self, LockStatus::Locked { .. })
    }
}

/// Outcome of recording one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureTally {
    /// Consecutive failures including this one.
    pub failures: u32,

    /// Set only when this failure crossed the threshold.
    pub locked_until: Option<DateTime<Utc>>,
}

/// Failure counter and lock window per subject.
#[derive(Debug)]
pub struct LockoutTracker {
    max_failed_attempts: u32,
    lockout_duration: Duration,
    entries: HashMap<SubjectId, LockoutEntry>,
}

impl LockoutTracker {
    /// Create a tracker with the given threshold and window.
    pub fn new(max_failed_attempts: u32, lockout_duration: Duration) -> Self {
        Self {
            max_failed_attempts,
            lockout_duration,
            entries: HashMap::new(),
        }
    }

    /// Failures allowed before lockout.
    pub fn max_failed_attempts(&self) -> u32 {
        self.max_failed_attempts
    }

    /// Check whether a subject is locked out at `now`.
    ///
    /// An entry whose lock window has passed is removed and the subject is
    /// reported unlocked with a fresh failure count.
    pub fn is_locked_out(&mut self, subject: &SubjectId, now: DateTime<Utc>) -> LockStatus {
        let Some(locked_until) = self.entries.get(subject).and_then(|e| e.locked_until) else {
            return LockStatus::Unlocked;
        };

        if locked_until > now {
            return LockStatus::Locked {
                remaining_seconds: remaining_seconds(locked_until, now),
            };
        }

        self.entries.remove(subject);
        tracing::debug!(subject = %subject, "Lockout window elapsed");
        LockStatus::Unlocked
    }

    /// Record one failure for a subject.
    ///
    /// The lock window is armed exactly once, on the failure that reaches
    /// the threshold. Failures recorded while already locked do not extend it.
    pub fn record_failure(&mut self, subject: &SubjectId, now: DateTime<Utc>) -> FailureTally {
        let entry = self.entries.entry(subject.clone()).or_default();

        if entry.locked_until.is_some_and(|until| until <= now) {
            *entry = LockoutEntry::default();
        }

        entry.failure_count = entry.failure_count.saturating_add(1);

        let mut tally = FailureTally {
            failures: entry.failure_count,
            locked_until: None,
        };

        if entry.failure_count >= self.max_failed_attempts && entry.locked_until.is_none() {
            let until = now
                .checked_add_signed(self.lockout_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            entry.locked_until = Some(until);
            tally.locked_until = Some(until);
            tracing::warn!(
                subject = %subject,
                failures = entry.failure_count,
                "Subject locked out after repeated failed attempts"
            );
        }

        tally
    }

    /// Clear all failure state for a subject.
    pub fn reset(&mut self, subject: &SubjectId) {
        self.entries.remove(subject);
    }

    /// Current consecutive failure count (0 if none tracked).
    pub fn failure_count(&self, subject: &SubjectId) -> u32 {
        self.entries
            .get(subject)
            .map(|e| e.failure_count)
            .unwrap_or(0)
    }

    /// Number of tracked subjects.
    #[cfg(test)]
    pub(crate) fn tracked_count(&self) -> usize {
        self.entries.len()
    }
}

/// Whole seconds from `now` to `until`, rounded up.
pub(crate) fn remaining_seconds(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = until.signed_duration_since(now).num_milliseconds().max(0) as u64;
    ((millis + 999) / 1_000).max(1)
}
