//! Altitude enrichment
//!
//! Polygon coverage areas are enriched with ground elevation before any
//! coordinate is handed to a worker. The [`ElevationLookup`] trait is the seam;
//! [`GoogleElevationLookup`] is the concrete implementation backed by the
//! Google Elevation API.
//!
//! ```ignore
//! use trainerfleet::elevation::{AsyncReqwestClient, GoogleElevationLookup};
//!
//! let client = AsyncReqwestClient::new()?;
//! let lookup = GoogleElevationLookup::new(client, "YOUR_API_KEY".to_string());
//! let altitudes = lookup.elevations(&cells).await?;
//! ```

mod google;
mod http;
mod types;

pub use google::{GoogleElevationLookup, ELEVATION_API_URL, MAX_LOCATIONS_PER_REQUEST};
pub use http::{AsyncHttpClient, AsyncReqwestClient};
pub use types::{ElevationError, ElevationLookup};

#[cfg(test)]
pub use http::tests::MockAsyncHttpClient;
#[cfg(test)]
pub use types::tests::{FailingLookup, FlatLookup};
