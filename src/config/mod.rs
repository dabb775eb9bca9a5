//! Configuration (layered: code > env > defaults).

pub mod routes;

pub use routes::{Endpoints, RouteConfig};

use std::time::Duration;

use bon::Builder;

use crate::refresh::ExclusionList;

const DEFAULT_API_URL: &str = "http://localhost:8000/";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the session layer needs to talk to the backend.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use authgate::config::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .api_url("https://api.example.com/v1/")
///     .bootstrap_timeout(Duration::from_secs(5))
///     .build();
/// assert_eq!(config.url_for("/users/me/"), "https://api.example.com/v1/users/me/");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct SessionConfig {
    /// Base URL every relative request path is joined onto.
    #[builder(into, default = DEFAULT_API_URL.to_string())]
    pub api_url: String,
    #[builder(default)]
    pub routes: RouteConfig,
    #[builder(default)]
    pub endpoints: Endpoints,
    /// Request paths whose 401 never triggers a refresh.
    #[builder(default)]
    pub exclusions: ExclusionList,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    /// Upper bound for the whole startup probe.
    #[builder(default = DEFAULT_BOOTSTRAP_TIMEOUT)]
    pub bootstrap_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SessionConfig {
    /// Load from environment variables (`AUTHGATE_API_URL`,
    /// `AUTHGATE_REQUEST_TIMEOUT_SECS`, `AUTHGATE_BOOTSTRAP_TIMEOUT_SECS`).
    ///
    /// A `.env` file is read first when present. Unparseable timeouts keep
    /// their defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        if let Ok(url) = std::env::var("AUTHGATE_API_URL") {
            config.api_url = url;
        }
        if let Some(timeout) = env_secs("AUTHGATE_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = timeout;
        }
        if let Some(timeout) = env_secs("AUTHGATE_BOOTSTRAP_TIMEOUT_SECS") {
            config.bootstrap_timeout = timeout;
        }

        config
    }

    /// Override the base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Absolute URL for a request path. Absolute inputs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn env_secs(var: &str) -> Option<Duration> {
    let raw = std::env::var(var).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!(var, value = %raw, "Ignoring unparseable timeout");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_layout() {
        let config = SessionConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.routes.login, "/login");
        assert_eq!(config.routes.verify_email, "/verify-email");
        assert_eq!(config.endpoints.refresh, "refresh-token/");
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.bootstrap_timeout, DEFAULT_BOOTSTRAP_TIMEOUT);
    }

    #[test]
    fn url_for_joins_without_doubled_slashes() {
        let config = SessionConfig::default().with_api_url("http://api.test/base/");
        assert_eq!(config.url_for("token/"), "http://api.test/base/token/");
        assert_eq!(config.url_for("/token/"), "http://api.test/base/token/");

        let bare = SessionConfig::default().with_api_url("http://api.test");
        assert_eq!(bare.url_for("users/me/"), "http://api.test/users/me/");
    }

    #[test]
    fn url_for_passes_absolute_urls_through() {
        let config = SessionConfig::default();
        assert_eq!(
            config.url_for("https://elsewhere.test/x"),
            "https://elsewhere.test/x"
        );
    }

    #[test]
    fn landing_check_ignores_query() {
        let routes = RouteConfig::default();
        assert!(routes.is_landing("/"));
        assert!(routes.is_landing("/?ref=mail"));
        assert!(!routes.is_landing("/login"));
    }
}
