//! Client-side routes and backend endpoint paths.

use serde::{Deserialize, Serialize};

/// Navigation targets the session layer redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Public landing page. Bootstrap is skipped here and refresh failures do
    /// not redirect away from it.
    pub landing: String,
    pub login: String,
    pub verify_email: String,
    pub change_password: String,
    /// Where a fully verified login lands.
    pub home: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            landing: "/".to_string(),
            login: "/login".to_string(),
            verify_email: "/verify-email".to_string(),
            change_password: "/change-password".to_string(),
            home: "/dashboards".to_string(),
        }
    }
}

impl RouteConfig {
    /// Whether `path` is the landing route, ignoring query and fragment.
    pub fn is_landing(&self, path: &str) -> bool {
        strip_query(path) == self.landing
    }
}

/// Backend endpoint paths, relative to the API base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub token: String,
    pub refresh: String,
    pub verify: String,
    pub profile: String,
    pub email_verified: String,
    pub logout: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token: "token/".to_string(),
            refresh: "refresh-token/".to_string(),
            verify: "verify-token/".to_string(),
            profile: "users/me/".to_string(),
            email_verified: "users/is-email-verified/".to_string(),
            logout: "logout/".to_string(),
        }
    }
}

pub(crate) fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}
