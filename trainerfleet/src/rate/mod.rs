//! Global call pacing shared by every worker.
//!
//! The [`RateCoordinator`] releases one permit per interval. Workers take a
//! permit before every outbound remote call (logins, scans and the relocation
//! retry), so the aggregate call rate is bounded by the interval no matter how
//! many workers run. There is no per-worker limiter.
//!
//! # Semantics
//!
//! - Permits do not accumulate: an interval that passes with nobody waiting
//!   leaves at most one permit available.
//! - Waiting workers are served in arrival order, but no fairness between
//!   workers is promised.
//! - The first permit is released one interval after start, which staggers
//!   fleet logins.
//!
//! ```ignore
//! use trainerfleet::rate::{RateConfig, RateCoordinator};
//!
//! let rate = RateCoordinator::start(RateConfig::default());
//! rate.acquire().await?;
//! session.map_objects().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Default time between permits.
pub const DEFAULT_RATE_INTERVAL: Duration = Duration::from_millis(500);

/// Shortest interval accepted; shorter values are raised to this.
const MIN_RATE_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for the rate coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateConfig {
    /// Time between two permits.
    pub interval: Duration,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_RATE_INTERVAL,
        }
    }
}

impl RateConfig {
    /// Configuration releasing one permit per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

/// Errors returned when acquiring a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RateError {
    /// The coordinator has been shut down.
    #[error("rate coordinator is shut down")]
    Closed,
}

/// Shared permit dispenser.
///
/// Created with [`RateCoordinator::start`], which spawns the dispensing task on
/// the current Tokio runtime. The task stops on [`shutdown`](Self::shutdown)
/// or when the coordinator is dropped.
#[derive(Debug)]
pub struct RateCoordinator {
    permits: Arc<Semaphore>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl RateCoordinator {
    /// Starts dispensing permits.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: RateConfig) -> Arc<Self> {
        let interval = config.interval.max(MIN_RATE_INTERVAL);
        let permits = Arc::new(Semaphore::new(0));
        let shutdown = CancellationToken::new();

        tokio::spawn(dispense(Arc::clone(&permits), interval, shutdown.clone()));
        info!(interval_ms = interval.as_millis() as u64, "Rate coordinator started");

        Arc::new(Self {
            permits,
            interval,
            shutdown,
        })
    }

    /// Waits for the next permit and consumes it.
    pub async fn acquire(&self) -> Result<(), RateError> {
        let permit = self.permits.acquire().await.map_err(|_| RateError::Closed)?;
        permit.forget();
        Ok(())
    }

    /// Time between permits.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stops dispensing. Pending and future `acquire` calls fail.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// True once the coordinator no longer hands out permits.
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }
}

impl Drop for RateCoordinator {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn dispense(permits: Arc<Semaphore>, interval: Duration, shutdown: CancellationToken) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            _ = ticker.tick() => {
                // Capped at one so idle intervals never turn into a burst.
                if permits.available_permits() == 0 {
                    permits.add_permits(1);
                }
            }
        }
    }

    permits.close();
    debug!("Rate coordinator stopped");
}
