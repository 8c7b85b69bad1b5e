//! Location providers and the coordinate feed
//!
//! A [`LocationProvider`] answers "where should the next scan happen?". Three
//! variants exist:
//!
//! - [`FixedProvider`] - one point, re-emitted forever
//! - [`HoneycombProvider`] - hexagonal rings around a center
//! - [`PolygonProvider`] - honeycomb cells clipped to a polygon, with altitude
//!
//! The [`LocationFeed`] owns the active provider and keeps the shared
//! coordinate queue full. Operators swap providers at runtime by sending a new
//! boxed provider over the feed's control channel.
//!
//! ```ignore
//! use trainerfleet::location::{HoneycombProvider, LocationFeed};
//!
//! let provider = HoneycombProvider::new(center, 1_000.0, 70.0)?;
//! let (feed, handles) = LocationFeed::new(Box::new(provider), 16);
//! tokio::spawn(feed.run(shutdown.clone()));
//!
//! // Redirect every worker to a new area
//! handles.control.send(Box::new(other_provider)).await?;
//! ```

mod factory;
mod feed;
mod fixed;
mod honeycomb;
mod polygon;
mod types;

pub use factory::{build_provider, build_provider_with, LocationConfig, DEFAULT_CELL_SPACING_M};
pub use feed::{FeedHandles, LocationFeed, LocationReceiver, DEFAULT_CONTROL_CAPACITY};
pub use fixed::FixedProvider;
pub use honeycomb::HoneycombProvider;
pub use polygon::PolygonProvider;
pub use types::{LocationError, LocationProvider};
