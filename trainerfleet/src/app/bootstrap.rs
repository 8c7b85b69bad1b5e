//! Fleet bootstrap implementation.
//!
//! `FleetApp` starts the pieces in dependency order: the location provider
//! first (polygon areas need their elevation lookups to finish), then the
//! feed, the rate coordinator and finally the workers.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::error::AppError;
use crate::config::FleetConfig;
use crate::fleet::{FleetHandle, FleetSupervisor, WorkerReport};
use crate::location::{build_provider, LocationFeed, LocationProvider};
use crate::rate::RateCoordinator;
use crate::session::{Account, Session};
use crate::store::ScanStore;
use crate::trainer::{ScanResult, TrainerContext};

/// A running fleet.
///
/// # Example
///
/// ```ignore
/// use trainerfleet::app::FleetApp;
///
/// let app = FleetApp::start(config, |account| MySession::new(account), store).await?;
///
/// while let Some(scan) = app.results().recv().await {
///     handle(scan.objects);
/// }
///
/// let reports = app.shutdown().await;
/// ```
pub struct FleetApp<M> {
    results: mpsc::Receiver<ScanResult<M>>,
    control: mpsc::Sender<Box<dyn LocationProvider>>,
    fleet: FleetHandle,
    rate: Arc<RateCoordinator>,
    shutdown: CancellationToken,
    feed: JoinHandle<()>,
}

impl<M: Send + 'static> FleetApp<M> {
    /// Builds the configured location provider and starts the fleet.
    ///
    /// # Errors
    ///
    /// Fails if the provider cannot be built (degenerate honeycomb, empty
    /// polygon, elevation lookup failure) or the fleet has no accounts.
    pub async fn start<S, F, St>(
        config: FleetConfig,
        make_session: F,
        store: Arc<St>,
    ) -> Result<Self, AppError>
    where
        S: Session<MapObjects = M>,
        F: FnMut(&Account) -> S,
        St: ScanStore,
    {
        let provider = build_provider(&config.location).await?;
        Self::start_with_provider(config, provider, make_session, store).await
    }

    /// Loads the INI configuration at `path` and starts the fleet from it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the file cannot be read or parsed, and
    /// otherwise fails like [`FleetApp::start`].
    pub async fn start_from_file<S, F, St>(
        path: &Path,
        make_session: F,
        store: Arc<St>,
    ) -> Result<Self, AppError>
    where
        S: Session<MapObjects = M>,
        F: FnMut(&Account) -> S,
        St: ScanStore,
    {
        let config = FleetConfig::load_from(path)?;
        info!(path = %path.display(), "Loaded fleet configuration");
        Self::start(config, make_session, store).await
    }

    /// Starts the fleet around an already built provider.
    pub async fn start_with_provider<S, F, St>(
        config: FleetConfig,
        provider: Box<dyn LocationProvider>,
        make_session: F,
        store: Arc<St>,
    ) -> Result<Self, AppError>
    where
        S: Session<MapObjects = M>,
        F: FnMut(&Account) -> S,
        St: ScanStore,
    {
        if config.accounts.is_empty() {
            return Err(AppError::Invalid("no accounts configured".to_string()));
        }
        let start = config
            .location
            .start_location()
            .ok_or_else(|| AppError::Invalid("location has no start point".to_string()))?;

        let shutdown = CancellationToken::new();

        let (feed, handles) = LocationFeed::new(provider, config.coordinate_queue_capacity);
        let feed = tokio::spawn(feed.run(shutdown.clone()));

        let rate = RateCoordinator::start(config.rate.clone());

        let (results_tx, results) = mpsc::channel(config.result_queue_capacity.max(1));
        let context = TrainerContext {
            locations: handles.locations,
            results: results_tx,
            rate: Arc::clone(&rate),
            store,
        };

        let supervisor = FleetSupervisor::new(config.trainer.clone(), context);
        let fleet = supervisor.spawn(config.accounts.clone(), start, make_session);

        info!(
            mode = config.location.mode(),
            accounts = config.accounts.len(),
            rate_interval_ms = rate.interval().as_millis() as u64,
            "Fleet app started"
        );

        Ok(Self {
            results,
            control: handles.control,
            fleet,
            rate,
            shutdown,
            feed,
        })
    }

    /// Scan results published by the workers.
    pub fn results(&mut self) -> &mut mpsc::Receiver<ScanResult<M>> {
        &mut self.results
    }

    /// Sender for replacement location providers.
    pub fn control(&self) -> mpsc::Sender<Box<dyn LocationProvider>> {
        self.control.clone()
    }

    /// The running workers.
    pub fn fleet(&mut self) -> &mut FleetHandle {
        &mut self.fleet
    }

    /// Stops the feed and the rate coordinator, then waits for every worker.
    ///
    /// Workers abandon on their next permit or coordinate request, so this
    /// returns within roughly one scan delay.
    pub async fn shutdown(self) -> Vec<WorkerReport> {
        let Self {
            results,
            control,
            mut fleet,
            rate,
            shutdown,
            feed,
        } = self;

        info!("Fleet app shutting down");
        shutdown.cancel();
        rate.shutdown();
        drop(control);
        // Unblocks workers waiting on a full results queue
        drop(results);

        if let Err(e) = feed.await {
            warn!(error = %e, "Location feed task failed");
        }

        fleet.join_all().await
    }
}
