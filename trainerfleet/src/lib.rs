//! TrainerFleet - Coordinated map scanning with a fleet of trainer accounts
//!
//! This library drives many authenticated game sessions that sweep a
//! geographic area together. A location feed hands out coordinates from a
//! honeycomb or polygon coverage plan, a global rate coordinator paces every
//! remote call, and one worker per account scans the coordinates it receives.

pub mod app;
pub mod config;
pub mod elevation;
pub mod fleet;
pub mod geo;
pub mod location;
pub mod logging;
pub mod rate;
pub mod session;
pub mod store;
pub mod trainer;

pub use app::{AppError, FleetApp};
pub use config::FleetConfig;
pub use geo::Coordinate;
