//! Request and response payloads of the session endpoints.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::session::Role;

/// Body of a successful `verify-token/` response.
pub(crate) const AUTHENTICATED_MESSAGE: &str = "User is authenticated";

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
    })
}

/// Login credentials. The identifier may be a username or an email address.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
    /// Ask the backend for long-lived cookies.
    pub remember: bool,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"..")
            .field("remember", &self.remember)
            .finish()
    }
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
            remember: false,
        }
    }

    pub fn remember(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }

    pub fn is_email(&self) -> bool {
        email_pattern().is_match(self.identifier.trim())
    }

    /// Form fields for `token/`: the identifier goes out as `email` or
    /// `username` depending on its shape.
    pub(crate) fn form_fields(&self) -> Vec<(String, String)> {
        let key = if self.is_email() { "email" } else { "username" };
        vec![
            (key.to_string(), self.identifier.trim().to_string()),
            ("password".to_string(), self.password.clone()),
            ("remember".to_string(), self.remember.to_string()),
        ]
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct VerifyResponse {
    #[serde(default)]
    pub message: String,
}

/// `users/me/` payload. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Raw role as reported; use [`UserProfile::role`] for the typed value.
    #[serde(default, rename = "role")]
    pub raw_role: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub requires_password_update: Option<bool>,
}

impl UserProfile {
    pub fn role(&self) -> Option<Role> {
        Role::coerce(self.raw_role.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct EmailVerification {
    #[serde(default)]
    pub email_verified: bool,
}

/// Where the application should go after a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    ChangePassword,
    VerifyEmail,
    Home,
}

/// Result of a completed login sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginOutcome {
    pub profile: UserProfile,
    pub email_verified: bool,
    pub next: NextStep,
    /// Route the navigator was sent to.
    pub route: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_identifiers_are_sent_as_email() {
        let fields = Credentials::new("alice@example.com", "pw").form_fields();
        assert_eq!(fields[0], ("email".to_string(), "alice@example.com".to_string()));
        assert_eq!(fields[2], ("remember".to_string(), "false".to_string()));
    }

    #[test]
    fn plain_identifiers_are_sent_as_username() {
        let credentials = Credentials::new("alice", "pw").remember(true);
        assert!(!credentials.is_email());
        let fields = credentials.form_fields();
        assert_eq!(fields[0], ("username".to_string(), "alice".to_string()));
        assert_eq!(fields[2], ("remember".to_string(), "true".to_string()));
    }

    #[test]
    fn debug_hides_password() {
        let rendered = format!("{:?}", Credentials::new("alice", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn profile_tolerates_missing_and_unknown_fields() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"username":"alice","role":"system_admin","organization_id":3,"theme":"dark"}"#,
        )
        .unwrap();
        assert_eq!(profile.role(), Some(Role::SystemAdmin));
        assert_eq!(profile.organization_id, Some(3));
        assert_eq!(profile.email_verified, None);

        let unknown: UserProfile = serde_json::from_str(r#"{"role":"owner"}"#).unwrap();
        assert_eq!(unknown.role(), None);
    }
}
