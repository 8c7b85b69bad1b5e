//! Per-account scan state machine
//!
//! ```text
//! LoggedOut ──► LoggingIn ──► Active ──► AwaitingLocation ──► Scanning ─┐
//!                   ▲           ▲                                       │
//!                   │           └───────────────────────────────────────┘
//!                   └── (session expired, up to 5 attempts)
//!
//! LoggingIn | AwaitingLocation ──► Abandoned   (terminal)
//! ```
//!
//! A worker abandons when re-authentication is exhausted or when no
//! coordinate arrives within the location timeout. Remote call failures are
//! logged and the loop carries on. Abandonment is final for the worker
//! instance; recovering means creating a new worker.

mod config;
mod state;
mod worker;

pub use config::{
    TrainerConfig, DEFAULT_LOCATION_TIMEOUT, DEFAULT_LOGIN_ATTEMPTS, DEFAULT_LOGIN_BACKOFF,
    DEFAULT_SCAN_DELAY,
};
pub use state::{AbandonReason, TrainerState};
pub use worker::{ScanResult, TrainerContext, TrainerWorker};
