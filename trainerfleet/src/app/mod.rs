//! Fleet bootstrap and lifecycle.
//!
//! ```text
//! FleetConfig ──► build_provider ──► LocationFeed ──► coordinate queue
//!                                    RateCoordinator        │
//!                                          │                ▼
//!                                          └──► FleetSupervisor ──► results
//! ```
//!
//! # Example
//!
//! ```ignore
//! use trainerfleet::app::FleetApp;
//! use trainerfleet::config::{config_file_path, FleetConfig};
//!
//! let config = FleetConfig::load()?;
//! let mut app = FleetApp::start(config, new_session, store).await?;
//!
//! // Or straight from a config file
//! let mut app = FleetApp::start_from_file(&config_file_path(), new_session, store).await?;
//!
//! // Redirect the fleet at runtime
//! app.control().send(Box::new(provider)).await?;
//!
//! let reports = app.shutdown().await;
//! ```

mod bootstrap;
mod error;

pub use bootstrap::FleetApp;
pub use error::AppError;
