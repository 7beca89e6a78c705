//! Presence gate error types.
//!
//! Rejections of a challenge (lockout, missing challenge, wrong code) are
//! ordinary outcomes and live in [`crate::gate`]. This enum only carries
//! faults: bad configuration, persistence trouble, entropy failure.

use thiserror::Error;

/// Faults that can occur while running the gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Registry could not be read from or written to disk.
    #[error("Registry persistence failure: {0}")]
    PersistenceFailure(String),

    /// Persisted registry exists but is not a valid grant map.
    #[error("Registry state is corrupt: {0}")]
    CorruptState(String),

    /// Challenge could not be shown on the display surface.
    #[error("Display error: {0}")]
    DisplayFailure(String),

    /// The operating system random source failed.
    #[error("Secure random source unavailable: {0}")]
    EntropyUnavailable(String),
}
