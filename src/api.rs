//! Wire-shaped surface for the transport/command layer.
//!
//! These functions take raw string subject ids and return serde types whose
//! JSON form is what a bot or RPC layer sends on:
//!
//! - `{"plaintext": "..."}` / `{"error": "locked_out", "retryAfterSeconds": 42}`
//! - `{"granted": true}` / `{"error": "wrong_code", "attemptsRemaining": 3}` /
//!   `{"error": "no_active_challenge"}`

use crate::gate::{AuthorizationGate, IssueOutcome, Rejection, VerifyOutcome};
use crate::{GateError, SubjectId};
use serde::{Deserialize, Serialize};

/// Error body shared by both responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum ErrorBody {
    /// Code did not match.
    #[serde(rename_all = "camelCase")]
    WrongCode {
        /// Failures left before lockout.
        attempts_remaining: u32,
    },
    /// Subject is locked out.
    #[serde(rename_all = "camelCase")]
    LockedOut {
        /// Seconds until a new attempt is allowed.
        retry_after_seconds: u64,
    },
    /// No live challenge (never issued or expired).
    NoActiveChallenge,
}

impl From<Rejection> for ErrorBody {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::LockedOut {
                retry_after_seconds,
            } => ErrorBody::LockedOut {
                retry_after_seconds,
            },
            Rejection::NoActiveChallenge => ErrorBody::NoActiveChallenge,
            Rejection::WrongCode { attempts_remaining } => {
                ErrorBody::WrongCode { attempts_remaining }
            }
        }
    }
}

/// Response to `issue_challenge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueResponse {
    /// Challenge issued; display `plaintext` on the console only.
    Issued {
        /// The one-time code.
        plaintext: String,
    },
    /// Issue refused.
    Error(ErrorBody),
}

/// Response to `submit_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitResponse {
    /// Code accepted.
    Granted {
        /// Always `true`.
        granted: bool,
    },
    /// Code refused.
    Error(ErrorBody),
}

/// Issue a challenge for `subject_id`.
///
/// # Errors
/// - `EntropyUnavailable` - the OS random source failed
pub fn issue_challenge(
    gate: &AuthorizationGate,
    subject_id: &str,
) -> Result<IssueResponse, GateError> {
    let response = match gate.issue(&SubjectId::from(subject_id))? {
        IssueOutcome::Issued(secret) => IssueResponse::Issued {
            plaintext: secret.into_string(),
        },
        IssueOutcome::LockedOut {
            retry_after_seconds,
        } => IssueResponse::Error(ErrorBody::LockedOut {
            retry_after_seconds,
        }),
    };
    Ok(response)
}

/// Submit a candidate code for `subject_id`.
pub fn submit_code(gate: &AuthorizationGate, subject_id: &str, text: &str) -> SubmitResponse {
    match gate.verify(&SubjectId::from(subject_id), text) {
        VerifyOutcome::Authorized(_) => SubmitResponse::Granted { granted: true },
        VerifyOutcome::Rejected(rejection) => SubmitResponse::Error(rejection.into()),
    }
}

/// Whether `subject_id` holds a durable grant.
pub fn is_authorized(gate: &AuthorizationGate, subject_id: &str) -> bool {
    gate.is_authorized(&SubjectId::from(subject_id))
}

/// Revoke `subject_id`'s grant.
pub fn revoke(gate: &AuthorizationGate, subject_id: &str) {
    gate.revoke(&SubjectId::from(subject_id));
}

/// Remove every grant, returning how many were removed.
pub fn clear_all(gate: &AuthorizationGate) -> usize {
    gate.clear_all().removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::config::GateConfig;
    use crate::persist::memory::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn gate() -> (AuthorizationGate, Arc<MockClock>) {
        let clock = Arc::new(MockClock::from_rfc3339("2025-01-15T12:00:00Z"));
        let gate = AuthorizationGate::new_with_clock(
            GateConfig::default(),
            Arc::new(MemoryStore::new()),
            clock.clone(),
        )
        .unwrap();
        (gate, clock)
    }

    fn plaintext(response: IssueResponse) -> String {
        match response {
            IssueResponse::Issued { plaintext } => plaintext,
            other => panic!("expected plaintext, got {:?}", other),
        }
    }

    #[test]
    fn test_error_body_json() {
        assert_eq!(
            serde_json::to_value(ErrorBody::WrongCode {
                attempts_remaining: 3
            })
            .unwrap(),
            json!({"error": "wrong_code", "attemptsRemaining": 3})
        );
        assert_eq!(
            serde_json::to_value(ErrorBody::LockedOut {
                retry_after_seconds: 42
            })
            .unwrap(),
            json!({"error": "locked_out", "retryAfterSeconds": 42})
        );
        assert_eq!(
            serde_json::to_value(ErrorBody::NoActiveChallenge).unwrap(),
            json!({"error": "no_active_challenge"})
        );
    }

    #[test]
    fn test_response_json() {
        assert_eq!(
            serde_json::to_value(SubmitResponse::Granted { granted: true }).unwrap(),
            json!({"granted": true})
        );
        assert_eq!(
            serde_json::to_value(IssueResponse::Issued {
                plaintext: "abc".to_string()
            })
            .unwrap(),
            json!({"plaintext": "abc"})
        );
    }

    #[test]
    fn test_submit_response_parses_error() {
        let parsed: SubmitResponse =
            serde_json::from_value(json!({"error": "no_active_challenge"})).unwrap();
        assert_eq!(parsed, SubmitResponse::Error(ErrorBody::NoActiveChallenge));
    }

    #[test]
    fn test_issue_and_submit_flow() {
        let (gate, _clock) = gate();
        let code = plaintext(issue_challenge(&gate, "42").unwrap());

        assert_eq!(
            submit_code(&gate, "42", &code),
            SubmitResponse::Granted { granted: true }
        );
        assert!(is_authorized(&gate, "42"));

        revoke(&gate, "42");
        assert!(!is_authorized(&gate, "42"));
    }

    #[test]
    fn test_ttl_scenario() {
        let (gate, clock) = gate();
        let first = plaintext(issue_challenge(&gate, "42").unwrap());

        clock.advance_secs(121);
        assert_eq!(
            submit_code(&gate, "42", &first),
            SubmitResponse::Error(ErrorBody::NoActiveChallenge)
        );

        let second = plaintext(issue_challenge(&gate, "42").unwrap());
        clock.advance_secs(1);
        assert_eq!(
            submit_code(&gate, "42", &second),
            SubmitResponse::Granted { granted: true }
        );
    }

    #[test]
    fn test_clear_all_count() {
        let (gate, _clock) = gate();
        for id in ["1", "2"] {
            let code = plaintext(issue_challenge(&gate, id).unwrap());
            submit_code(&gate, id, &code);
        }
        assert_eq!(clear_all(&gate), 2);
        assert_eq!(clear_all(&gate), 0);
    }
}
