//! Room Controller configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults. No required variables and no secrets live here; unparsable
//! values fall back to the defaults.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Default session TTL in seconds; a heartbeat resets the clock.
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 60;

/// Default driver cadence in milliseconds. One backend call is serviced per
/// tick, so this bounds the backend call rate.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

/// Room Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long a room lives without a heartbeat.
    pub session_ttl: Duration,

    /// Cadence of the bridge driver loop.
    pub tick_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RC_SESSION_TTL_SECONDS` - Session TTL (default: 60)
    /// - `RC_TICK_INTERVAL_MS` - Driver tick interval (default: 20)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let session_ttl_seconds = vars
            .get("RC_SESSION_TTL_SECONDS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECONDS);

        let tick_interval_ms = vars
            .get("RC_TICK_INTERVAL_MS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS);

        Self {
            session_ttl: Duration::from_secs(session_ttl_seconds),
            tick_interval: Duration::from_millis(tick_interval_ms),
        }
    }
}
