//! Error types for authgate.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Tagged outcome of a failed HTTP exchange.
///
/// Transports only produce `Network` and `Decode`; `Status` is created when a
/// response with a non-success status is turned into an error, so 401
/// detection is a plain match instead of probing optional response fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl HttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Why a shared refresh attempt failed. Every caller waiting on the same
/// flight receives a clone of the same value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    #[error("refresh rejected with status {status}")]
    Rejected { status: u16 },

    #[error("refresh endpoint unreachable: {0}")]
    Unreachable(String),
}

/// Primary error type for all authgate operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Session expired and refresh was rejected (status {status})")]
    RefreshRejected { status: u16 },

    #[error("Session expired and refresh could not be completed: {0}")]
    RefreshUnavailable(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session changed by a newer login or logout")]
    Superseded,

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<RefreshFailure> for SessionError {
    fn from(failure: RefreshFailure) -> Self {
        match failure {
            RefreshFailure::Rejected { status } => Self::RefreshRejected { status },
            RefreshFailure::Unreachable(message) => Self::RefreshUnavailable(message),
        }
    }
}

impl SessionError {
    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(HttpError::Network(_)) => ErrorCategory::Network,
            Self::Http(HttpError::Decode(_)) => ErrorCategory::Decode,
            Self::Http(HttpError::Status { status, .. }) => match status {
                401 => ErrorCategory::ExpiredSession,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Client,
            },
            Self::RefreshRejected { .. } | Self::RefreshUnavailable(_) => {
                ErrorCategory::RefreshRejected
            }
            Self::InvalidCredentials => ErrorCategory::Credentials,
            Self::Superseded => ErrorCategory::Superseded,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }

    /// Whether the session was torn down while handling this error.
    pub fn is_session_lost(&self) -> bool {
        matches!(
            self,
            Self::RefreshRejected { .. } | Self::RefreshUnavailable(_)
        )
    }

    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        self.category().recovery_suggestion()
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, SessionError>;
