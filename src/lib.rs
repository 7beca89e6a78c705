//! # Presence Gate
//!
//! **Physical-presence authorization for remote actors.**
//!
//! A remote actor, identified by an opaque subject id, proves they can see a
//! console by echoing back a one-time code that was displayed only on that
//! console. A correct echo grants a durable authorization flag; repeated
//! failures lock the subject out for a while.
//!
//! ## Features
//!
//! - **128-bit one-time codes** — drawn from the OS CSPRNG, URL-safe base64
//! - **Hashed at rest** — only SHA-256 digests are stored, never the plaintext
//! - **Constant-time comparison** — no timing signal for "close" guesses
//! - **Single-use challenges** — consumed on every submission, right or wrong
//! - **Lockout** — 5 failures lock a subject for 5 minutes (configurable)
//! - **Atomic persistence** — grants survive restarts; a corrupt store loads
//!   as empty, never as "everyone authorized"
//!
//! ## Quickstart
//!
//! ```no_run
//! use presence_gate::{
//!     AuthorizationGate, ConsoleDisplay, FileStore, GateConfig, GateError, Presentation,
//!     SubjectId, Verdict,
//! };
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), GateError> {
//!     let store = Arc::new(FileStore::new("my-bot")?);
//!     let gate = AuthorizationGate::new(GateConfig::default(), store)?;
//!     let console = ConsoleDisplay::stdout();
//!
//!     let subject = SubjectId::from(123456789i64);
//!     if let Verdict::Denied(reason) = gate.guard(&subject) {
//!         println!("denied: {:?}", reason);
//!         if let Presentation::Displayed = gate.issue_to(&subject, &console)? {
//!             // Later, when the actor replies over the remote channel:
//!             let outcome = gate.verify(&subject, "code typed by the actor");
//!             println!("{:?}", outcome);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! The gate protects against:
//! - **Remote guessing** — 128-bit codes, single use, lockout after failures
//! - **Timing probes** — digests compared in constant time
//! - **Stale codes** — challenges expire after the configured TTL
//!
//! The gate does **not** bind subject ids to a cryptographic identity. A
//! subject id is whatever the transport says it is.
//!
//! ## Configuration
//!
//! - `challenge_ttl` — how long an issued code stays redeemable (120 s)
//! - `max_failed_attempts` — consecutive failures before lockout (5)
//! - `lockout_duration` — length of the lock window (300 s)
//!
//! See [`GateConfig`] for full documentation.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;
pub mod subject;

// Crypto layer
pub mod crypto;

// State layer
pub mod store;

// Persistence layer
pub mod persist;

// Display surface
pub mod display;

// Gate (main public API)
pub mod gate;

// Transport-facing surface
pub mod api;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::GateConfig;
pub use crypto::secret::PlaintextSecret;
pub use display::{ChallengeDisplay, ConsoleDisplay};
pub use errors::GateError;
pub use gate::{
    AuthorizationGate, ClearReport, DenyReason, Durability, IssueOutcome, Presentation,
    Rejection, Verdict, VerifyOutcome,
};
pub use persist::file::FileStore;
pub use persist::memory::MemoryStore;
pub use persist::RegistryStore;
pub use subject::SubjectId;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
