//! Gate configuration.

use crate::GateError;
use std::time::Duration;

/// Default challenge lifetime (2 minutes).
pub const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(120);

/// Default number of consecutive failures before a subject is locked out.
pub const DEFAULT_MAX_FAILED_ATTEMPTS: u32 = 5;

/// Default lockout window (5 minutes).
pub const DEFAULT_LOCKOUT_DURATION: Duration = Duration::from_secs(300);

/// Timing and threshold settings for an [`AuthorizationGate`](crate::AuthorizationGate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Maximum age at which an issued challenge may still be redeemed.
    pub challenge_ttl: Duration,

    /// Consecutive failed submissions that trigger a lockout.
    pub max_failed_attempts: u32,

    /// How long a subject stays locked out once the threshold is crossed.
    pub lockout_duration: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            challenge_ttl: DEFAULT_CHALLENGE_TTL,
            max_failed_attempts: DEFAULT_MAX_FAILED_ATTEMPTS,
            lockout_duration: DEFAULT_LOCKOUT_DURATION,
        }
    }
}

impl GateConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.challenge_ttl.is_zero() {
            return Err(GateError::ConfigError(
                "challenge_ttl must be greater than zero".to_string(),
            ));
        }
        if self.max_failed_attempts == 0 {
            return Err(GateError::ConfigError(
                "max_failed_attempts must be at least 1".to_string(),
            ));
        }
        if self.lockout_duration.is_zero() {
            return Err(GateError::ConfigError(
                "lockout_duration must be greater than zero".to_string(),
            ));
        }
        // chrono durations are bounded well below u64 seconds
        let limit = Duration::from_secs(i64::MAX as u64 / 1_000);
        if self.challenge_ttl > limit || self.lockout_duration > limit {
            return Err(GateError::ConfigError(format!(
                "durations must not exceed {} seconds",
                limit.as_secs()
            )));
        }
        Ok(())
    }

    /// Challenge TTL as a chrono duration.
    pub(crate) fn ttl(&self) -> chrono::Duration {
        to_chrono(self.challenge_ttl)
    }

    /// Lockout window as a chrono duration.
    pub(crate) fn lockout(&self) -> chrono::Duration {
        to_chrono(self.lockout_duration)
    }
}

fn to_chrono(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::seconds(i64::MAX / 1_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.challenge_ttl, Duration::from_secs(120));
        assert_eq!(config.max_failed_attempts, 5);
        assert_eq!(config.lockout_duration, Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let config = GateConfig {
            challenge_ttl: Duration::ZERO,
            ..GateConfig::default()
        };
        assert!(matches!(config.validate(), Err(GateError::ConfigError(_))));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = GateConfig {
            max_failed_attempts: 0,
            ..GateConfig::default()
        };
        assert!(matches!(config.validate(), Err(GateError::ConfigError(_))));
    }

    #[test]
    fn test_zero_lockout_rejected() {
        let config = GateConfig {
            lockout_duration: Duration::ZERO,
            ..GateConfig::default()
        };
        assert!(matches!(config.validate(), Err(GateError::ConfigError(_))));
    }

    #[test]
    fn test_huge_duration_rejected() {
        let config = GateConfig {
            lockout_duration: Duration::from_secs(u64::MAX),
            ..GateConfig::default()
        };
        assert!(matches!(config.validate(), Err(GateError::ConfigError(_))));
    }

    #[test]
    fn test_chrono_conversion() {
        let config = GateConfig::default();
        assert_eq!(config.ttl().num_seconds(), 120);
        assert_eq!(config.lockout().num_seconds(), 300);
    }
}
