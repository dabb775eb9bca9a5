use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role assigned to the account by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// The backend's explicit "no role" value.
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    Unassigned,
    Guest,
    User,
    Admin,
    SystemAdmin,
}

impl Role {
    /// Parse a role reported by the backend; anything unrecognised is `None`.
    pub fn coerce(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| value.trim().parse().ok())
    }
}

/// Snapshot of the client's view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub authenticated: bool,
    pub email_verified: bool,
    pub role: Option<Role>,
    /// True while the startup check is outstanding. Guards must not redirect.
    pub loading: bool,
    /// True once the whole login sequence (or bootstrap) has settled.
    pub login_flow_completed: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            authenticated: false,
            email_verified: false,
            role: None,
            loading: true,
            login_flow_completed: false,
        }
    }
}

impl SessionState {
    /// Drop everything tied to the identity. `loading` is left alone.
    pub(crate) fn clear_identity(&mut self) {
        self.authenticated = false;
        self.email_verified = false;
        self.role = None;
        self.login_flow_completed = false;
    }

    /// Enforce that an unauthenticated state carries no identity data.
    pub(crate) fn normalize(&mut self) {
        if !self.authenticated {
            self.clear_identity();
        }
    }

    /// Fully settled and allowed through an authenticated guard.
    pub fn is_established(&self) -> bool {
        !self.loading && self.authenticated && self.login_flow_completed
    }
}
