//! Long-running coordinate feed with hot-swappable provider.
//!
//! The feed is the single owner of the active [`LocationProvider`]. It pushes
//! coordinates into a bounded queue shared by all workers; a full queue blocks
//! the feed, which paces generation to consumption.
//!
//! Replacement providers arrive over a control channel. Pending replacements
//! are drained before every coordinate is produced, and the feed also listens
//! for them while it is blocked on a full queue. A swap is therefore observed
//! even when the feed spends nearly all of its time waiting on backpressure.
//! The coordinate that was waiting to be queued when a swap arrives is
//! dropped; there is no continuity between old and new providers.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::LocationProvider;
use crate::geo::Coordinate;

/// Default capacity of the provider control channel.
pub const DEFAULT_CONTROL_CAPACITY: usize = 4;

/// Shared consumer end of the coordinate queue.
///
/// Workers lock it only for the duration of a single receive.
pub type LocationReceiver = Arc<Mutex<mpsc::Receiver<Coordinate>>>;

/// Endpoints handed out when a feed is created.
#[derive(Debug)]
pub struct FeedHandles {
    /// Coordinate queue consumed by workers.
    pub locations: LocationReceiver,
    /// Sends replacement providers to the running feed.
    pub control: mpsc::Sender<Box<dyn LocationProvider>>,
}

/// The coordinate producer task.
pub struct LocationFeed {
    provider: Box<dyn LocationProvider>,
    locations_tx: mpsc::Sender<Coordinate>,
    control_rx: mpsc::Receiver<Box<dyn LocationProvider>>,
}

impl std::fmt::Debug for LocationFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationFeed")
            .field("cells", &self.provider.locations().len())
            .finish_non_exhaustive()
    }
}

impl LocationFeed {
    /// Creates a feed around `provider` with a coordinate queue of `capacity`.
    pub fn new(provider: Box<dyn LocationProvider>, capacity: usize) -> (Self, FeedHandles) {
        let (locations_tx, locations_rx) = mpsc::channel(capacity.max(1));
        let (control_tx, control_rx) = mpsc::channel(DEFAULT_CONTROL_CAPACITY);

        let feed = Self {
            provider,
            locations_tx,
            control_rx,
        };
        let handles = FeedHandles {
            locations: Arc::new(Mutex::new(locations_rx)),
            control: control_tx,
        };

        (feed, handles)
    }

    /// Runs until `shutdown` is cancelled or every consumer is gone.
    pub async fn run(self, shutdown: CancellationToken) {
        let Self {
            mut provider,
            locations_tx,
            mut control_rx,
        } = self;

        info!(
            cells = provider.locations().len(),
            "Location feed starting"
        );

        loop {
            while let Ok(next) = control_rx.try_recv() {
                provider = swap(next);
            }

            let location = provider.next_location();

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Location feed shutting down");
                    break;
                }

                Some(next) = control_rx.recv() => {
                    provider = swap(next);
                }

                sent = locations_tx.send(location) => {
                    if sent.is_err() {
                        info!("All location consumers gone, stopping feed");
                        break;
                    }
                    debug!(
                        lat = location.latitude,
                        lon = location.longitude,
                        "Queued location"
                    );
                }
            }
        }
    }
}

fn swap(next: Box<dyn LocationProvider>) -> Box<dyn LocationProvider> {
    info!(
        cells = next.locations().len(),
        "Switching to new location provider"
    );
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{FixedProvider, HoneycombProvider};
    use std::time::Duration;

    fn fixed(lat: f64, lon: f64) -> Box<dyn LocationProvider> {
        Box::new(FixedProvider::new(Coordinate::new(lat, lon)))
    }

    async fn recv(locations: &LocationReceiver) -> Coordinate {
        tokio::time::timeout(Duration::from_secs(1), locations.lock().await.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_feed_follows_provider_order() {
        let provider = HoneycombProvider::new(Coordinate::new(0.0, 0.0), 200.0, 70.0).unwrap();
        let expected = provider.locations().to_vec();

        let (feed, handles) = LocationFeed::new(Box::new(provider), 4);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(feed.run(shutdown.clone()));

        for cell in expected.iter().chain(expected.iter()) {
            let got = recv(&handles.locations).await;
            assert_eq!((got.latitude, got.longitude), (cell.latitude, cell.longitude));
        }

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_swap_observed_while_blocked_on_full_queue() {
        let (feed, handles) = LocationFeed::new(fixed(1.0, 1.0), 1);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(feed.run(shutdown.clone()));

        // Let the feed fill the queue and block on the next send
        tokio::time::sleep(Duration::from_millis(20)).await;
        handles.control.send(fixed(2.0, 2.0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let queued = recv(&handles.locations).await;
        assert_eq!(queued.latitude, 1.0, "already queued coordinate is kept");

        for _ in 0..3 {
            let next = recv(&handles.locations).await;
            assert_eq!((next.latitude, next.longitude), (2.0, 2.0));
        }

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_feed_stops_when_consumers_dropped() {
        let (feed, handles) = LocationFeed::new(fixed(1.0, 1.0), 2);
        let handle = tokio::spawn(feed.run(CancellationToken::new()));

        drop(handles);

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("feed should stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_feed_stops_on_shutdown() {
        let (feed, _handles) = LocationFeed::new(fixed(1.0, 1.0), 1);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(feed.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("feed should stop")
            .unwrap();
    }
}
