//! Fleet supervision.
//!
//! The [`FleetSupervisor`] starts one [`TrainerWorker`] task per account. All
//! workers share the same [`TrainerContext`]: one coordinate queue, one
//! results queue, one rate coordinator and one scan store.
//!
//! ```text
//!                 ┌──────────────┐
//!   LocationFeed ─► coord queue  ├──► worker(ash)  ──┐
//!                 │  (shared)    ├──► worker(misty) ─┼──► results queue
//!                 └──────────────┘──► worker(brock) ─┘
//!                         ▲                 │
//!                         └── RateCoordinator (one permit per call)
//! ```
//!
//! Startup staggering comes from each worker's first permit acquisition. The
//! supervisor adds no delays of its own.

use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::geo::Coordinate;
use crate::session::{Account, Session};
use crate::store::ScanStore;
use crate::trainer::{AbandonReason, TrainerConfig, TrainerContext, TrainerWorker};

/// Final outcome of one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Account the worker ran for.
    pub username: String,
    /// Why the worker stopped.
    pub reason: AbandonReason,
}

/// Starts workers that share one [`TrainerContext`].
pub struct FleetSupervisor<M, St> {
    config: TrainerConfig,
    context: TrainerContext<M, St>,
}

impl<M, St> FleetSupervisor<M, St>
where
    M: Send + 'static,
    St: ScanStore,
{
    pub fn new(config: TrainerConfig, context: TrainerContext<M, St>) -> Self {
        Self { config, context }
    }

    /// Spawns one worker per account, all starting at `start`.
    ///
    /// `make_session` is called once per account and the resulting session is
    /// owned by that worker alone.
    pub fn spawn<S, F>(&self, accounts: Vec<Account>, start: Coordinate, mut make_session: F) -> FleetHandle
    where
        S: Session<MapObjects = M>,
        F: FnMut(&Account) -> S,
    {
        let mut workers = JoinSet::new();

        for account in accounts {
            let session = make_session(&account);
            let username = account.username.clone();
            let ctx = self.context.clone();
            let mut worker = TrainerWorker::new(account, start, session, self.config.clone());

            workers.spawn(async move {
                let reason = worker.run(&ctx).await;
                WorkerReport { username, reason }
            });
        }

        info!(workers = workers.len(), "Fleet started");
        FleetHandle { workers }
    }
}

/// Running workers of a fleet.
#[derive(Debug)]
pub struct FleetHandle {
    workers: JoinSet<WorkerReport>,
}

impl FleetHandle {
    /// Number of workers still tracked.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Waits for the next worker to stop.
    ///
    /// Returns `None` once every worker has been collected. Panicked or
    /// aborted workers are logged and skipped.
    pub async fn join_next(&mut self) -> Option<WorkerReport> {
        while let Some(joined) = self.workers.join_next().await {
            match joined {
                Ok(report) => return Some(report),
                Err(e) if e.is_cancelled() => continue,
                Err(e) => warn!(error = %e, "Worker task failed"),
            }
        }
        None
    }

    /// Waits for every worker and returns their reports.
    pub async fn join_all(&mut self) -> Vec<WorkerReport> {
        let mut reports = Vec::with_capacity(self.workers.len());
        while let Some(report) = self.join_next().await {
            reports.push(report);
        }
        reports
    }

    /// Aborts every running worker.
    pub fn abort_all(&mut self) {
        self.workers.abort_all();
    }
}
