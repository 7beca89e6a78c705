//! Authorization Gate - the main public API.
//!
//! The `AuthorizationGate` ties the stores together:
//! - Issue a one-time challenge for out-of-band display
//! - Verify a submitted code against the live challenge
//! - Count failures and lock out brute-force guessing
//! - Grant, revoke and persist durable authorization
//!
//! Per subject the state machine is
//! `Unauthenticated -> ChallengeIssued -> {Authorized | Unauthenticated (+1 failure)}`,
//! with `LockedOut` checked before any transition out of `Unauthenticated`.

use crate::clock::{Clock, SystemClock};
use crate::config::GateConfig;
use crate::crypto::secret::{self, hash_candidate, PlaintextSecret};
use crate::display::ChallengeDisplay;
use crate::persist::RegistryStore;
use crate::store::challenge::ChallengeStore;
use crate::store::lockout::{remaining_seconds, LockStatus, LockoutTracker};
use crate::store::registry::AuthorizedSubjectRegistry;
use crate::{GateError, SubjectId};
use std::sync::{Arc, Mutex, MutexGuard};

/// Result of asking for a challenge.
#[derive(Debug)]
pub enum IssueOutcome {
    /// A fresh challenge; show the plaintext on the console only.
    Issued(PlaintextSecret),
    /// Subject is locked out.
    LockedOut {
        /// Seconds until a new attempt is allowed.
        retry_after_seconds: u64,
    },
}

/// Result of [`AuthorizationGate::issue_to`], where the plaintext has already
/// gone to the display and is not handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// The code was shown on the display.
    Displayed,
    /// Subject is locked out; nothing was issued.
    LockedOut {
        /// Seconds until a new attempt is allowed.
        retry_after_seconds: u64,
    },
}

/// Why a submitted code was refused.
///
/// Carries enough to render a helpful message, never how close a guess was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Subject is inside a lock window.
    LockedOut {
        /// Seconds until a new attempt is allowed.
        retry_after_seconds: u64,
    },
    /// No challenge was issued, or it expired. Deliberately indistinguishable.
    NoActiveChallenge,
    /// The code did not match.
    WrongCode {
        /// Failures left before lockout.
        attempts_remaining: u32,
    },
}

/// Whether a state change reached disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// Saved to the registry store.
    Persisted,
    /// Save failed and was logged; the in-memory state stands.
    MemoryOnly,
}

/// Result of submitting a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code matched; the subject is now authorized.
    Authorized(Durability),
    /// Code refused.
    Rejected(Rejection),
}

impl VerifyOutcome {
    /// Whether authorization was granted.
    pub fn is_authorized(&self) -> bool {
        matches!(self, VerifyOutcome::Authorized(_))
    }
}

/// Why a command was refused by [`AuthorizationGate::guard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// Subject is inside a lock window.
    LockedOut {
        /// Seconds until a new attempt is allowed.
        retry_after_seconds: u64,
    },
    /// Subject has never been granted, or was revoked.
    NotAuthorized,
}

/// Verdict for a protected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Run the command.
    Allowed,
    /// Refuse the command.
    Denied(DenyReason),
}

/// Result of [`AuthorizationGate::clear_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearReport {
    /// Grants removed.
    pub removed: usize,
    /// Whether the empty registry reached disk.
    pub durability: Durability,
}

/// All mutable state, guarded together.
#[derive(Debug)]
struct GateState {
    challenges: ChallengeStore,
    lockouts: LockoutTracker,
    registry: AuthorizedSubjectRegistry,
}

/// Physical-presence authorization gate.
///
/// Create one per process and share it (it is `Send + Sync`). Every call
/// takes a single internal lock for its in-memory work; the registry save
/// runs afterwards under a separate lock so disk I/O never stalls other
/// subjects' decisions.
pub struct AuthorizationGate {
    config: GateConfig,
    clock: Arc<dyn Clock>,
    store: Arc<dyn RegistryStore>,
    state: Mutex<GateState>,
    persist_lock: Mutex<()>,
}

impl AuthorizationGate {
    /// Create a gate and load the registry from `store`.
    ///
    /// Uses the system clock for expiry and lockout.
    ///
    /// # Errors
    /// Returns `ConfigError` if configuration validation fails. A missing or
    /// corrupt registry is not an error; it loads as empty.
    pub fn new(config: GateConfig, store: Arc<dyn RegistryStore>) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self::with_clock(config, store, Arc::new(SystemClock)))
    }

    /// Create a gate with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn new_with_clock(
        config: GateConfig,
        store: Arc<dyn RegistryStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self::with_clock(config, store, clock))
    }

    fn with_clock(config: GateConfig, store: Arc<dyn RegistryStore>, clock: Arc<dyn Clock>) -> Self {
        let registry = AuthorizedSubjectRegistry::load(store.as_ref());
        let lockouts = LockoutTracker::new(config.max_failed_attempts, config.lockout());

        Self {
            config,
            clock,
            store,
            state: Mutex::new(GateState {
                challenges: ChallengeStore::new(),
                lockouts,
                registry,
            }),
            persist_lock: Mutex::new(()),
        }
    }

    /// Issue a challenge for a subject.
    ///
    /// Any earlier challenge for the subject is superseded and can no longer
    /// be satisfied. The caller must show the plaintext only on a surface
    /// the remote actor cannot see without being physically present.
    ///
    /// # Errors
    /// - `EntropyUnavailable` - the OS random source failed
    pub fn issue(&self, subject: &SubjectId) -> Result<IssueOutcome, GateError> {
        let now = self.clock.now_utc();
        let mut state = self.lock_state();

        if let LockStatus::Locked { remaining_seconds } = state.lockouts.is_locked_out(subject, now) {
            tracing::warn!(subject = %subject, remaining_seconds, "Challenge refused, subject locked out");
            return Ok(IssueOutcome::LockedOut {
                retry_after_seconds: remaining_seconds,
            });
        }

        let plaintext = secret::generate()?;
        let digest = plaintext.digest();
        tracing::debug!(subject = %subject, digest = %digest.fingerprint(), "Challenge issued");
        state.challenges.put(subject, digest, now);

        Ok(IssueOutcome::Issued(plaintext))
    }

    /// Issue a challenge and hand its plaintext straight to `display`.
    ///
    /// # Errors
    /// - `EntropyUnavailable` - the OS random source failed
    /// - any error returned by the display
    pub fn issue_to(
        &self,
        subject: &SubjectId,
        display: &dyn ChallengeDisplay,
    ) -> Result<Presentation, GateError> {
        match self.issue(subject)? {
            IssueOutcome::Issued(plaintext) => {
                display.show(subject, &plaintext, self.config.challenge_ttl)?;
                Ok(Presentation::Displayed)
            }
            IssueOutcome::LockedOut {
                retry_after_seconds,
            } => Ok(Presentation::LockedOut {
                retry_after_seconds,
            }),
        }
    }

    /// Verify a submitted code.
    ///
    /// The live challenge is consumed whatever the outcome. Every rejection
    /// other than `LockedOut` counts as one failure, including a missing or
    /// expired challenge; the failure that reaches the threshold is reported
    /// as `LockedOut`. A missing challenge for a subject that already holds
    /// a grant is not counted.
    pub fn verify(&self, subject: &SubjectId, candidate: &str) -> VerifyOutcome {
        // Always hashed, outside the lock, whether or not a challenge exists.
        let candidate_digest = hash_candidate(candidate);
        let now = self.clock.now_utc();

        {
            let mut state = self.lock_state();

            if let LockStatus::Locked { remaining_seconds } =
                state.lockouts.is_locked_out(subject, now)
            {
                tracing::warn!(subject = %subject, "Code submitted while locked out");
                return VerifyOutcome::Rejected(Rejection::LockedOut {
                    retry_after_seconds: remaining_seconds,
                });
            }

            let stored = state
                .challenges
                .take_if_fresh(subject, self.config.ttl(), now);

            let matched = match stored {
                Some(expected) => expected.ct_eq(&candidate_digest),
                // A duplicate delivery after a grant is not a guess.
                None if state.registry.is_authorized(subject) => {
                    tracing::debug!(subject = %subject, "No challenge for authorized subject");
                    return VerifyOutcome::Rejected(Rejection::NoActiveChallenge);
                }
                None => {
                    let rejection = Self::fail(&mut state, subject, now, None);
                    return VerifyOutcome::Rejected(rejection);
                }
            };

            if !matched {
                let max = state.lockouts.max_failed_attempts();
                let rejection = Self::fail(&mut state, subject, now, Some(max));
                return VerifyOutcome::Rejected(rejection);
            }

            state.lockouts.reset(subject);
            state.registry.grant(subject);
            tracing::info!(subject = %subject, "Subject authorized");
        }

        VerifyOutcome::Authorized(self.persist())
    }

    /// Record a failure and pick the rejection to report.
    ///
    /// `wrong_code_of` is `Some(max_attempts)` for a mismatched code and
    /// `None` for a missing challenge.
    fn fail(
        state: &mut GateState,
        subject: &SubjectId,
        now: chrono::DateTime<chrono::Utc>,
        wrong_code_of: Option<u32>,
    ) -> Rejection {
        let tally = state.lockouts.record_failure(subject, now);
        tracing::warn!(subject = %subject, attempt = tally.failures, "Failed authorization attempt");

        if let Some(until) = tally.locked_until {
            return Rejection::LockedOut {
                retry_after_seconds: remaining_seconds(until, now),
            };
        }

        match wrong_code_of {
            Some(max) => Rejection::WrongCode {
                attempts_remaining: max.saturating_sub(tally.failures),
            },
            None => Rejection::NoActiveChallenge,
        }
    }

    /// Whether the subject holds a durable grant.
    pub fn is_authorized(&self, subject: &SubjectId) -> bool {
        self.lock_state().registry.is_authorized(subject)
    }

    /// Decide whether a protected command may run for `subject`.
    ///
    /// A held grant allows the command outright. Lockout only gates
    /// subjects that have not been authorized.
    pub fn guard(&self, subject: &SubjectId) -> Verdict {
        let now = self.clock.now_utc();
        let mut state = self.lock_state();

        if state.registry.is_authorized(subject) {
            return Verdict::Allowed;
        }

        if let LockStatus::Locked { remaining_seconds } = state.lockouts.is_locked_out(subject, now) {
            tracing::warn!(subject = %subject, "Locked-out subject attempted a command");
            return Verdict::Denied(DenyReason::LockedOut {
                retry_after_seconds: remaining_seconds,
            });
        }

        Verdict::Denied(DenyReason::NotAuthorized)
    }

    /// Revoke a subject's grant and persist.
    pub fn revoke(&self, subject: &SubjectId) -> Durability {
        let removed = self.lock_state().registry.revoke(subject);
        if removed {
            tracing::info!(subject = %subject, "Authorization revoked");
        }
        self.persist()
    }

    /// Remove every grant, persist, and report how many were removed.
    pub fn clear_all(&self) -> ClearReport {
        let removed = self.lock_state().registry.clear_all();
        tracing::info!(removed, "Cleared all authorized subjects");
        ClearReport {
            removed,
            durability: self.persist(),
        }
    }

    /// Number of authorized subjects.
    pub fn authorized_count(&self) -> usize {
        self.lock_state().registry.len()
    }

    /// Consecutive failures currently counted against a subject.
    pub fn failure_count(&self, subject: &SubjectId) -> u32 {
        self.lock_state().lockouts.failure_count(subject)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Save the registry.
    ///
    /// The snapshot is taken under the persist lock, so concurrent saves
    /// land in order and the last write always carries the latest state.
    fn persist(&self) -> Durability {
        let _persist = self
            .persist_lock
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let registry = self.lock_state().registry.clone();

        match registry.save(self.store.as_ref()) {
            Ok(()) => Durability::Persisted,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist registry, keeping in-memory state");
                Durability::MemoryOnly
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Gate state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
