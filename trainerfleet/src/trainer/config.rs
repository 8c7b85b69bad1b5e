//! Worker timing configuration.

use std::time::Duration;

/// Default pause between two scans of one worker.
pub const DEFAULT_SCAN_DELAY: Duration = Duration::from_secs(10);

/// Default wait for a coordinate before the worker abandons.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of re-login attempts after the session expires.
pub const DEFAULT_LOGIN_ATTEMPTS: u32 = 5;

/// Default backoff step; attempt `i` is followed by a pause of `i` steps.
pub const DEFAULT_LOGIN_BACKOFF: Duration = Duration::from_secs(10);

/// Timing and retry settings shared by every worker of a fleet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerConfig {
    /// Sleep after each scan iteration.
    pub scan_delay: Duration,

    /// How long to wait for the next coordinate.
    pub location_timeout: Duration,

    /// Re-login attempts before abandoning.
    pub login_attempts: u32,

    /// Backoff multiplier between failed login attempts.
    pub login_backoff: Duration,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            scan_delay: DEFAULT_SCAN_DELAY,
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
            login_attempts: DEFAULT_LOGIN_ATTEMPTS,
            login_backoff: DEFAULT_LOGIN_BACKOFF,
        }
    }
}

impl TrainerConfig {
    /// Set the scan delay.
    pub fn with_scan_delay(mut self, delay: Duration) -> Self {
        self.scan_delay = delay;
        self
    }

    /// Set the location timeout.
    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    /// Set the number of re-login attempts.
    pub fn with_login_attempts(mut self, attempts: u32) -> Self {
        self.login_attempts = attempts;
        self
    }

    /// Set the login backoff step.
    pub fn with_login_backoff(mut self, step: Duration) -> Self {
        self.login_backoff = step;
        self
    }

    /// Pause after failed login attempt `attempt` (zero based).
    ///
    /// Saturates at `Duration::MAX` for extreme backoff steps.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.login_backoff.saturating_mul(attempt)
    }
}
