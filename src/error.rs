//! Error types and handling for the weathernews pipeline

use thiserror::Error;

/// Why a position fix could not be obtained.
///
/// Every variant is absorbed by the location resolver, which falls back to a
/// fixed coordinate; they only change the warning text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location unavailable")]
    PositionUnavailable,

    #[error("Location request timeout")]
    PositionTimeout,
}

/// Main error type for the weathernews pipeline
#[derive(Error, Debug)]
pub enum WeatherNewsError {
    /// Position capability failures
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Upstream answered with a non-success status
    #[error("HTTP error ({status}): {body}")]
    Http { status: u16, body: String },

    /// Upstream payload did not have the expected shape
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Transport failures, including timeouts
    #[error("Network error: {message}")]
    Network { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Settings store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherNewsError {
    /// Create a new HTTP status error
    pub fn http<S: Into<String>>(status: u16, body: S) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// HTTP status carried by this error, if any
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Location(err) => format!("Unable to get location: {err}"),
            Self::Http { status: 401, .. } => {
                "The weather service rejected the API key. Please check your configuration."
                    .to_string()
            }
            Self::Http { status, .. } => format!("The weather service returned an error ({status})."),
            Self::Parse { .. } => "Received unexpected data from the weather service.".to_string(),
            Self::Network { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            Self::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            Self::Validation { message } => format!("Invalid input: {message}"),
            Self::Storage { .. } => "Saving or loading your settings failed.".to_string(),
            Self::Io { .. } => "File operation failed. Please check file permissions.".to_string(),
        }
    }
}

impl From<reqwest_middleware::Error> for WeatherNewsError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::network(err.to_string())
    }
}

impl From<reqwest::Error> for WeatherNewsError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err.to_string())
    }
}

impl From<serde_json::Error> for WeatherNewsError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(err.to_string())
    }
}
