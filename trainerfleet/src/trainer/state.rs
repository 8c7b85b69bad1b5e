//! Worker lifecycle states.

use std::fmt;

/// Where a worker is in its scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    /// No valid session.
    LoggedOut,
    /// Logging in or re-authenticating.
    LoggingIn,
    /// Logged in, between scans.
    Active,
    /// Waiting for the next coordinate.
    AwaitingLocation,
    /// Map objects call in flight.
    Scanning,
    /// Terminal; the worker performs no further action.
    Abandoned,
}

impl TrainerState {
    /// Short description for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainerState::LoggedOut => "LoggedOut",
            TrainerState::LoggingIn => "LoggingIn",
            TrainerState::Active => "Active",
            TrainerState::AwaitingLocation => "AwaitingLocation",
            TrainerState::Scanning => "Scanning",
            TrainerState::Abandoned => "Abandoned",
        }
    }

    /// True for the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrainerState::Abandoned)
    }
}

impl fmt::Display for TrainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonReason {
    /// Every re-login attempt failed.
    AuthExhausted { attempts: u32 },
    /// No coordinate arrived within the location timeout.
    LocationTimeout,
    /// The coordinate queue was closed.
    LocationFeedClosed,
    /// The rate coordinator was shut down.
    CoordinatorClosed,
}

impl fmt::Display for AbandonReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbandonReason::AuthExhausted { attempts } => {
                write!(f, "all {} login attempts failed", attempts)
            }
            AbandonReason::LocationTimeout => write!(f, "timed out waiting for a location"),
            AbandonReason::LocationFeedClosed => write!(f, "location feed closed"),
            AbandonReason::CoordinatorClosed => write!(f, "rate coordinator shut down"),
        }
    }
}
