//! Application error types.

use std::fmt;

use crate::config::ConfigError;
use crate::location::LocationError;

/// Errors that can occur while starting the fleet.
#[derive(Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is inconsistent.
    Config(ConfigError),

    /// The location provider could not be built.
    Location(LocationError),

    /// Configuration loaded but cannot start a fleet.
    Invalid(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Location(e) => write!(f, "Failed to build location provider: {}", e),
            AppError::Invalid(msg) => write!(f, "Invalid fleet setup: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(e) => Some(e),
            AppError::Location(e) => Some(e),
            AppError::Invalid(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        AppError::Location(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Invalid("no accounts".to_string());
        assert!(err.to_string().contains("Invalid fleet setup"));
        assert!(err.to_string().contains("no accounts"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_app_error_from_location_error() {
        let app_err: AppError = LocationError::EmptyPolygon.into();
        assert!(matches!(app_err, AppError::Location(_)));
        assert!(app_err.source().is_some());
    }
}
