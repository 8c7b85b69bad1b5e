//! The trainer worker.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

use super::{AbandonReason, TrainerConfig, TrainerState};
use crate::geo::Coordinate;
use crate::location::LocationReceiver;
use crate::rate::RateCoordinator;
use crate::session::{Account, Session, SessionError};
use crate::store::ScanStore;

/// A successful scan published to the results queue.
#[derive(Debug, Clone)]
pub struct ScanResult<M> {
    /// Account that performed the scan.
    pub username: String,
    /// Where the scan happened.
    pub location: Coordinate,
    /// Raw map objects response.
    pub objects: M,
}

/// Resources shared by every worker of a fleet.
pub struct TrainerContext<M, St> {
    /// Coordinate queue (consumer side).
    pub locations: LocationReceiver,
    /// Results queue (producer side).
    pub results: mpsc::Sender<ScanResult<M>>,
    /// Global call pacing.
    pub rate: Arc<RateCoordinator>,
    /// Scanned location store.
    pub store: Arc<St>,
}

impl<M, St> Clone for TrainerContext<M, St> {
    fn clone(&self) -> Self {
        Self {
            locations: Arc::clone(&self.locations),
            results: self.results.clone(),
            rate: Arc::clone(&self.rate),
            store: Arc::clone(&self.store),
        }
    }
}

/// One account's scan loop.
///
/// Owns its session exclusively. Shared state is only reached through the
/// queues and the rate coordinator in [`TrainerContext`].
pub struct TrainerWorker<S: Session> {
    account: Account,
    location: Coordinate,
    session: S,
    state: TrainerState,
    config: TrainerConfig,
    abandoned: Option<AbandonReason>,
}

impl<S: Session> std::fmt::Debug for TrainerWorker<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainerWorker")
            .field("account", &self.account)
            .field("location", &self.location)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<S: Session> TrainerWorker<S> {
    /// Creates a logged-out worker positioned at `start`.
    pub fn new(account: Account, start: Coordinate, session: S, config: TrainerConfig) -> Self {
        Self {
            account,
            location: start,
            session,
            state: TrainerState::LoggedOut,
            config,
            abandoned: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrainerState {
        self.state
    }

    /// Last position the worker moved to.
    pub fn location(&self) -> Coordinate {
        self.location
    }

    /// Account username.
    pub fn username(&self) -> &str {
        &self.account.username
    }

    /// Runs the scan loop until the worker abandons.
    ///
    /// Calling `run` again on an abandoned worker returns the original reason
    /// immediately without touching the session.
    pub async fn run<St: ScanStore>(
        &mut self,
        ctx: &TrainerContext<S::MapObjects, St>,
    ) -> AbandonReason {
        if let Some(reason) = self.abandoned {
            return reason;
        }

        let reason = self.hunt(ctx).await;

        self.transition(TrainerState::Abandoned);
        self.abandoned = Some(reason);
        warn!(
            username = %self.account.username,
            reason = %reason,
            "Abandoning hunt"
        );
        reason
    }

    async fn hunt<St: ScanStore>(&mut self, ctx: &TrainerContext<S::MapObjects, St>) -> AbandonReason {
        // Initial logins are staggered through the coordinator too
        if let Err(reason) = self.initial_login(ctx).await {
            return reason;
        }

        loop {
            if let Err(reason) = self.iterate(ctx).await {
                return reason;
            }
        }
    }

    async fn initial_login<St: ScanStore>(
        &mut self,
        ctx: &TrainerContext<S::MapObjects, St>,
    ) -> Result<(), AbandonReason> {
        self.transition(TrainerState::LoggingIn);
        acquire_permit(&ctx.rate).await?;

        match self.session.login(&self.account, &self.location).await {
            Ok(()) => {
                info!(username = %self.account.username, "Logged in");
                self.transition(TrainerState::Active);
            }
            Err(e) => {
                warn!(username = %self.account.username, error = %e, "Initial login failed");
                self.transition(TrainerState::LoggedOut);
            }
        }
        Ok(())
    }

    async fn iterate<St: ScanStore>(
        &mut self,
        ctx: &TrainerContext<S::MapObjects, St>,
    ) -> Result<(), AbandonReason> {
        if self.session.is_expired() {
            info!(username = %self.account.username, "Session expired, logging in again");
            self.relogin(ctx).await?;
        }

        acquire_permit(&ctx.rate).await?;

        let location = self.await_location(ctx).await?;
        self.move_to(location);

        self.scan(ctx).await?;

        time::sleep(self.config.scan_delay).await;
        Ok(())
    }

    async fn relogin<St: ScanStore>(
        &mut self,
        ctx: &TrainerContext<S::MapObjects, St>,
    ) -> Result<(), AbandonReason> {
        self.transition(TrainerState::LoggingIn);

        for attempt in 0..self.config.login_attempts {
            acquire_permit(&ctx.rate).await?;

            match self.session.login(&self.account, &self.location).await {
                Ok(()) => {
                    info!(username = %self.account.username, attempt, "Logged in");
                    self.transition(TrainerState::Active);
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        username = %self.account.username,
                        attempt,
                        error = %e,
                        "Login failed"
                    );
                    time::sleep(self.config.backoff_for(attempt)).await;
                }
            }
        }

        Err(AbandonReason::AuthExhausted {
            attempts: self.config.login_attempts,
        })
    }

    async fn await_location<St: ScanStore>(
        &mut self,
        ctx: &TrainerContext<S::MapObjects, St>,
    ) -> Result<Coordinate, AbandonReason> {
        self.transition(TrainerState::AwaitingLocation);

        let next = time::timeout(self.config.location_timeout, async {
            ctx.locations.lock().await.recv().await
        })
        .await;

        match next {
            Ok(Some(location)) => Ok(location),
            Ok(None) => Err(AbandonReason::LocationFeedClosed),
            Err(_) => Err(AbandonReason::LocationTimeout),
        }
    }

    fn move_to(&mut self, location: Coordinate) {
        self.location = location;
        self.session.move_to(&location);
        info!(
            username = %self.account.username,
            lat = location.latitude,
            lon = location.longitude,
            "Hunting at"
        );
    }

    async fn scan<St: ScanStore>(
        &mut self,
        ctx: &TrainerContext<S::MapObjects, St>,
    ) -> Result<(), AbandonReason> {
        self.transition(TrainerState::Scanning);

        match self.fetch_map_objects(ctx).await {
            Ok(()) => {}
            Err(SessionError::RpcRelocated) => {
                debug!(username = %self.account.username, "RPC endpoint relocated, retrying once");
                acquire_permit(&ctx.rate).await?;
                if let Err(e) = self.fetch_map_objects(ctx).await {
                    warn!(username = %self.account.username, error = %e, "Map objects retry failed");
                }
            }
            Err(e) => {
                warn!(username = %self.account.username, error = %e, "Map objects request failed");
            }
        }

        self.transition(TrainerState::Active);
        Ok(())
    }

    /// Requests map objects, then publishes and records the scan.
    ///
    /// Only the remote call can fail; publish and store problems are logged.
    async fn fetch_map_objects<St: ScanStore>(
        &mut self,
        ctx: &TrainerContext<S::MapObjects, St>,
    ) -> Result<(), SessionError> {
        let objects = self.session.map_objects().await?;

        let result = ScanResult {
            username: self.account.username.clone(),
            location: self.location,
            objects,
        };
        if ctx.results.send(result).await.is_err() {
            warn!(username = %self.account.username, "Results queue closed, dropping scan");
        }

        if let Err(e) = ctx
            .store
            .record_scanned_location(self.location.latitude, self.location.longitude)
            .await
        {
            warn!(username = %self.account.username, error = %e, "Failed to record scanned location");
        }

        Ok(())
    }

    fn transition(&mut self, next: TrainerState) {
        if self.state != next {
            debug!(
                username = %self.account.username,
                from = %self.state,
                to = %next,
                "Trainer state change"
            );
            self.state = next;
        }
    }
}

/// Waits for the next permit.
///
/// Borrows only the coordinator. Holding `&self` across this await would
/// require `S: Sync` for the worker future to be `Send`.
async fn acquire_permit(rate: &RateCoordinator) -> Result<(), AbandonReason> {
    rate.acquire()
        .await
        .map_err(|_| AbandonReason::CoordinatorClosed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate::RateConfig;
    use crate::store::tests::FailingStore;
    use crate::store::MemoryScanStore;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use tokio::time::Instant;

    const RATE: Duration = Duration::from_millis(10);

    #[derive(Clone, Default)]
    struct Calls {
        logins: Arc<AtomicUsize>,
        map_calls: Arc<AtomicUsize>,
        login_times: Arc<StdMutex<Vec<Instant>>>,
        map_times: Arc<StdMutex<Vec<Instant>>>,
    }

    impl Calls {
        fn logins(&self) -> usize {
            self.logins.load(Ordering::SeqCst)
        }

        fn map_calls(&self) -> usize {
            self.map_calls.load(Ordering::SeqCst)
        }

        /// Offsets of each login from `start`.
        fn login_offsets(&self, start: Instant) -> Vec<Duration> {
            offsets(&self.login_times, start)
        }

        /// Offsets of each map objects call from `start`.
        fn map_offsets(&self, start: Instant) -> Vec<Duration> {
            offsets(&self.map_times, start)
        }
    }

    /// Whether `offset` falls on permit tick `n` of `interval`.
    fn on_tick(offset: Duration, interval: Duration, n: u32) -> bool {
        offset >= interval * n && offset < interval * n + Duration::from_secs(1)
    }

    fn offsets(times: &StdMutex<Vec<Instant>>, start: Instant) -> Vec<Duration> {
        times.lock().unwrap().iter().map(|t| *t - start).collect()
    }

    /// Session replaying scripted outcomes. Unscripted calls succeed.
    #[derive(Default)]
    struct ScriptedSession {
        logins: VecDeque<Result<(), SessionError>>,
        map_objects: VecDeque<Result<u32, SessionError>>,
        expire_after_map_calls: Option<usize>,
        logged_in: bool,
        position: Option<Coordinate>,
        calls: Calls,
    }

    impl ScriptedSession {
        fn new(calls: &Calls) -> Self {
            Self {
                calls: calls.clone(),
                ..Default::default()
            }
        }

        fn logins(mut self, outcomes: Vec<Result<(), SessionError>>) -> Self {
            self.logins = outcomes.into();
            self
        }

        fn map_objects(mut self, outcomes: Vec<Result<u32, SessionError>>) -> Self {
            self.map_objects = outcomes.into();
            self
        }
    }

    impl Session for ScriptedSession {
        type MapObjects = u32;

        async fn login(&mut self, _account: &Account, _location: &Coordinate) -> Result<(), SessionError> {
            self.calls.logins.fetch_add(1, Ordering::SeqCst);
            self.calls.login_times.lock().unwrap().push(Instant::now());
            let outcome = self.logins.pop_front().unwrap_or(Ok(()));
            self.logged_in = outcome.is_ok();
            outcome
        }

        fn is_expired(&self) -> bool {
            !self.logged_in
        }

        fn move_to(&mut self, location: &Coordinate) {
            self.position = Some(*location);
        }

        async fn map_objects(&mut self) -> Result<u32, SessionError> {
            let n = self.calls.map_calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.calls.map_times.lock().unwrap().push(Instant::now());
            if self.expire_after_map_calls == Some(n) {
                self.logged_in = false;
            }
            self.map_objects.pop_front().unwrap_or(Ok(n as u32))
        }
    }

    struct Harness<St> {
        ctx: TrainerContext<u32, St>,
        locations_tx: mpsc::Sender<Coordinate>,
        results_rx: mpsc::Receiver<ScanResult<u32>>,
    }

    fn harness<St: ScanStore>(store: Arc<St>) -> Harness<St> {
        harness_with_rate(store, RATE)
    }

    fn harness_with_rate<St: ScanStore>(store: Arc<St>, rate: Duration) -> Harness<St> {
        let (locations_tx, locations_rx) = mpsc::channel(8);
        let (results_tx, results_rx) = mpsc::channel(8);
        let ctx = TrainerContext {
            locations: Arc::new(Mutex::new(locations_rx)),
            results: results_tx,
            rate: RateCoordinator::start(RateConfig::new(rate)),
            store,
        };
        Harness {
            ctx,
            locations_tx,
            results_rx,
        }
    }

    fn worker(session: ScriptedSession) -> TrainerWorker<ScriptedSession> {
        let config = TrainerConfig::default().with_scan_delay(Duration::from_millis(50));
        TrainerWorker::new(
            Account::new("ash", "secret"),
            Coordinate::new(0.0, 0.0),
            session,
            config,
        )
    }

    fn drain<M>(rx: &mut mpsc::Receiver<ScanResult<M>>) -> Vec<ScanResult<M>> {
        let mut results = Vec::new();
        while let Ok(result) = rx.try_recv() {
            results.push(result);
        }
        results
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_exhaustion_abandons_without_scanning() {
        let calls = Calls::default();
        let session = ScriptedSession::new(&calls)
            .logins(vec![Err(SessionError::Auth("banned".into())); 6]);
        let h = harness(Arc::new(MemoryScanStore::new()));
        h.locations_tx.send(Coordinate::new(1.0, 1.0)).await.unwrap();

        let mut worker = worker(session);
        let start = Instant::now();
        let reason = worker.run(&h.ctx).await;

        assert_eq!(reason, AbandonReason::AuthExhausted { attempts: 5 });
        assert_eq!(worker.state(), TrainerState::Abandoned);
        // One initial login plus five retries
        assert_eq!(calls.logins(), 6);
        assert_eq!(calls.map_calls(), 0);
        // Backoff 0 + 10 + 20 + 30 + 40 seconds
        assert!(start.elapsed() >= Duration::from_secs(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_worker_stays_abandoned() {
        let calls = Calls::default();
        let session = ScriptedSession::new(&calls)
            .logins(vec![Err(SessionError::Auth("banned".into())); 6]);
        let h = harness(Arc::new(MemoryScanStore::new()));

        let mut worker = worker(session);
        let first = worker.run(&h.ctx).await;
        let second = worker.run(&h.ctx).await;

        assert_eq!(first, second);
        assert_eq!(calls.logins(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_location_timeout_abandons_without_scanning() {
        let calls = Calls::default();
        let h = harness(Arc::new(MemoryScanStore::new()));

        let mut worker = worker(ScriptedSession::new(&calls));
        let start = Instant::now();
        let reason = worker.run(&h.ctx).await;

        assert_eq!(reason, AbandonReason::LocationTimeout);
        assert_eq!(calls.map_calls(), 0);
        assert!(start.elapsed() >= Duration::from_secs(30));
        drop(h.locations_tx);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_feed_abandons() {
        let calls = Calls::default();
        let h = harness(Arc::new(MemoryScanStore::new()));
        drop(h.locations_tx);

        let mut worker = worker(ScriptedSession::new(&calls));
        assert_eq!(worker.run(&h.ctx).await, AbandonReason::LocationFeedClosed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_relocation_retried_once_then_published() {
        let calls = Calls::default();
        let session = ScriptedSession::new(&calls)
            .map_objects(vec![Err(SessionError::RpcRelocated), Ok(7)]);
        let store = Arc::new(MemoryScanStore::new());
        let mut h = harness(Arc::clone(&store));
        h.locations_tx.send(Coordinate::new(1.5, 2.5)).await.unwrap();

        let mut worker = worker(session);
        let reason = worker.run(&h.ctx).await;

        assert_eq!(reason, AbandonReason::LocationTimeout);
        assert_eq!(calls.map_calls(), 2);

        let results = drain(&mut h.results_rx);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].objects, 7);
        assert_eq!(results[0].username, "ash");
        assert!(store.get(1.5, 2.5).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_relocation_retry_failure_is_not_retried_again() {
        let calls = Calls::default();
        let session = ScriptedSession::new(&calls).map_objects(vec![
            Err(SessionError::RpcRelocated),
            Err(SessionError::RpcRelocated),
        ]);
        let mut h = harness(Arc::new(MemoryScanStore::new()));
        h.locations_tx.send(Coordinate::new(1.0, 1.0)).await.unwrap();

        let mut worker = worker(session);
        worker.run(&h.ctx).await;

        assert_eq!(calls.map_calls(), 2);
        assert!(drain(&mut h.results_rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_skip_iteration_but_continue() {
        let calls = Calls::default();
        let session = ScriptedSession::new(&calls)
            .map_objects(vec![Err(SessionError::Remote("503".into())), Ok(11)]);
        let mut h = harness(Arc::new(MemoryScanStore::new()));
        h.locations_tx.send(Coordinate::new(1.0, 1.0)).await.unwrap();
        h.locations_tx.send(Coordinate::new(2.0, 2.0)).await.unwrap();

        let mut worker = worker(session);
        let reason = worker.run(&h.ctx).await;

        assert_eq!(reason, AbandonReason::LocationTimeout);
        assert_eq!(calls.map_calls(), 2);

        let results = drain(&mut h.results_rx);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].objects, 11);
        assert_eq!(results[0].location.latitude, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_logs_in_again() {
        let calls = Calls::default();
        let mut session = ScriptedSession::new(&calls);
        session.expire_after_map_calls = Some(1);
        let mut h = harness(Arc::new(MemoryScanStore::new()));
        h.locations_tx.send(Coordinate::new(1.0, 1.0)).await.unwrap();
        h.locations_tx.send(Coordinate::new(2.0, 2.0)).await.unwrap();

        let mut worker = worker(session);
        worker.run(&h.ctx).await;

        assert_eq!(calls.logins(), 2);
        assert_eq!(calls.map_calls(), 2);
        assert_eq!(drain(&mut h.results_rx).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_initial_login_recovers_in_loop() {
        let calls = Calls::default();
        let session = ScriptedSession::new(&calls)
            .logins(vec![Err(SessionError::Auth("timeout".into())), Ok(())]);
        let mut h = harness(Arc::new(MemoryScanStore::new()));
        h.locations_tx.send(Coordinate::new(1.0, 1.0)).await.unwrap();

        let mut worker = worker(session);
        worker.run(&h.ctx).await;

        assert_eq!(calls.logins(), 2);
        assert_eq!(drain(&mut h.results_rx).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_does_not_stop_scanning() {
        let calls = Calls::default();
        let store = Arc::new(FailingStore::default());
        let mut h = harness(Arc::clone(&store));
        h.locations_tx.send(Coordinate::new(1.0, 1.0)).await.unwrap();
        h.locations_tx.send(Coordinate::new(2.0, 2.0)).await.unwrap();

        let mut worker = worker(ScriptedSession::new(&calls));
        worker.run(&h.ctx).await;

        assert_eq!(drain(&mut h.results_rx).len(), 2);
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_updates_worker_and_session() {
        let calls = Calls::default();
        let h = harness(Arc::new(MemoryScanStore::new()));
        h.locations_tx.send(Coordinate::new(3.0, 4.0)).await.unwrap();

        let mut worker = worker(ScriptedSession::new(&calls));
        worker.run(&h.ctx).await;

        assert_eq!(worker.location(), Coordinate::new(3.0, 4.0));
        assert_eq!(worker.session.position, Some(Coordinate::new(3.0, 4.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_coordinator_abandons() {
        let calls = Calls::default();
        let h = harness(Arc::new(MemoryScanStore::new()));
        h.ctx.rate.shutdown();

        let mut worker = worker(ScriptedSession::new(&calls));
        assert_eq!(worker.run(&h.ctx).await, AbandonReason::CoordinatorClosed);
        assert_eq!(calls.logins(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_login_and_relocation_retry_takes_a_permit() {
        const SLOW: Duration = Duration::from_secs(1000);
        let calls = Calls::default();
        let session = ScriptedSession::new(&calls)
            .logins(vec![
                Err(SessionError::Auth("timeout".into())),
                Err(SessionError::Auth("timeout".into())),
                Ok(()),
            ])
            .map_objects(vec![Err(SessionError::RpcRelocated), Ok(3)]);

        let start = Instant::now();
        let mut h = harness_with_rate(Arc::new(MemoryScanStore::new()), SLOW);
        h.locations_tx.send(Coordinate::new(1.0, 1.0)).await.unwrap();

        let mut worker = worker(session);
        worker.run(&h.ctx).await;

        // Initial login then two retries, each on its own permit
        let logins = calls.login_offsets(start);
        assert_eq!(logins.len(), 3);
        for (n, offset) in (1..).zip(&logins) {
            assert!(on_tick(*offset, SLOW, n), "login {} at {:?}", n, offset);
        }

        // Scan permit, then one more for the relocation retry
        let scans = calls.map_offsets(start);
        assert_eq!(scans.len(), 2);
        for (n, offset) in (4..).zip(&scans) {
            assert!(on_tick(*offset, SLOW, n), "map call at {:?}", offset);
        }
        assert_eq!(drain(&mut h.results_rx).len(), 1);
    }
}
