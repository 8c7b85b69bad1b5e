//! Remote game session capability.
//!
//! The protocol client (authentication, request signing, RPC transport) lives
//! outside this crate. Workers only sequence calls through the [`Session`]
//! trait, which keeps the scan state machine testable with scripted sessions.

use std::fmt;
use std::future::Future;

use thiserror::Error;

use crate::geo::Coordinate;

/// Default authentication provider identifier.
pub const DEFAULT_AUTH_PROVIDER: &str = "ptc";

/// Credentials for one trainer account.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    /// Login name.
    pub username: String,
    /// Login secret.
    pub password: String,
    /// Authentication provider identifier (e.g. `ptc`, `google`).
    pub provider: String,
}

impl Account {
    /// Creates an account using the default auth provider.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            provider: DEFAULT_AUTH_PROVIDER.to_string(),
        }
    }

    /// Sets the auth provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }
}

// Passwords never end up in logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("provider", &self.provider)
            .finish()
    }
}

/// Errors surfaced by a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Login was rejected or the auth service failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server moved the RPC endpoint; the call may be retried once.
    #[error("RPC endpoint relocated")]
    RpcRelocated,

    /// Any other remote failure.
    #[error("remote call failed: {0}")]
    Remote(String),
}

/// A logged-in connection to the game API, owned by exactly one worker.
///
/// `login` (re)initialises the session in place; a failed login leaves the
/// session expired.
pub trait Session: Send + 'static {
    /// Response of the map objects call.
    type MapObjects: Send + 'static;

    /// Logs `account` in, reporting `location` as the starting position.
    fn login(
        &mut self,
        account: &Account,
        location: &Coordinate,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// True when there is no valid auth ticket.
    fn is_expired(&self) -> bool;

    /// Updates the position reported with subsequent calls.
    fn move_to(&mut self, location: &Coordinate);

    /// Requests map objects around the current position.
    fn map_objects(&mut self) -> impl Future<Output = Result<Self::MapObjects, SessionError>> + Send;
}
