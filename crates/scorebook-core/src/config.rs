//! Match book configuration.

use chrono::Duration;

/// Hours a match is kept after creation when nothing else is configured.
pub const DEFAULT_RETENTION_HOURS: i64 = 24;

const RETENTION_ENV: &str = "SCOREBOOK_RETENTION_HOURS";

/// Settings for [`crate::match_book::MatchBook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchBookConfig {
    /// Matches older than this are expired on read.
    pub retention: Duration,
}

impl Default for MatchBookConfig {
    fn default() -> Self {
        Self {
            retention: Duration::hours(DEFAULT_RETENTION_HOURS),
        }
    }
}

impl MatchBookConfig {
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Create from environment variables
    ///
    /// Reads:
    /// - SCOREBOOK_RETENTION_HOURS (optional, default: 24, must be positive)
    pub fn from_env() -> std::result::Result<Self, String> {
        match std::env::var(RETENTION_ENV) {
            Ok(raw) => Self::from_hours_str(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    fn from_hours_str(raw: &str) -> std::result::Result<Self, String> {
        let hours: i64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("{RETENTION_ENV} must be a whole number of hours, got '{raw}'"))?;
        if hours <= 0 {
            return Err(format!("{RETENTION_ENV} must be positive, got {hours}"));
        }
        Ok(Self::default().with_retention(Duration::hours(hours)))
    }
}
