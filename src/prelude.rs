//! Convenience re-exports for common use.

pub use crate::client::{Credentials, LoginOutcome, NextStep, SessionClient};
pub use crate::config::SessionConfig;
pub use crate::error::{Result, SessionError};
pub use crate::guard::{GuardDecision, Guarded, RequireAuthenticated, RequireRole, RouteGuard};
pub use crate::http::ApiRequest;
pub use crate::navigation::{HistoryNavigator, Navigator};
pub use crate::session::{Role, SessionState, SessionStore};
