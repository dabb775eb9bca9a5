//! Error classification for session-aware callers.

use serde::{Deserialize, Serialize};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request never reached the server.
    Network,
    /// A protected endpoint answered 401.
    ExpiredSession,
    /// The refresh endpoint refused to renew the session.
    RefreshRejected,
    /// The credential exchange rejected the supplied login.
    Credentials,
    /// Any other 4xx.
    Client,
    /// 5xx.
    Server,
    Decode,
    Timeout,
    Configuration,
    /// A newer login or logout replaced the operation's session.
    Superseded,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    Retry,
    LogIn,
    CheckCredentials,
    CheckConfiguration,
    ShowError,
}

impl ErrorCategory {
    pub fn recovery_suggestion(self) -> RecoverySuggestion {
        match self {
            Self::Network | Self::Timeout | Self::Server => RecoverySuggestion::Retry,
            Self::ExpiredSession | Self::RefreshRejected | Self::Superseded => {
                RecoverySuggestion::LogIn
            }
            Self::Credentials => RecoverySuggestion::CheckCredentials,
            Self::Configuration => RecoverySuggestion::CheckConfiguration,
            Self::Client | Self::Decode => RecoverySuggestion::ShowError,
        }
    }
}
