use serde::{Deserialize, Serialize};

use crate::config::routes::strip_query;

/// Endpoints that answer 401 on purpose (anonymous flows, the refresh call
/// itself) and therefore never trigger a refresh.
const DEFAULT_EXCLUSIONS: &[&str] = &[
    "token/",
    "refresh-token/",
    "register/",
    "forgot-password/",
    "reset-password/",
    "users/verify-email/",
    "users/send-verification-email/",
];

/// Path fragments exempt from refresh-and-retry.
///
/// A fragment matches when the request path ends with it on a segment
/// boundary: `token/` matches `/token/` and `/api/token/` but not
/// `/verify-token/` or `/refresh-token/`. Query strings are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionList {
    fragments: Vec<String>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUSIONS.iter().copied())
    }
}

impl ExclusionList {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
        }
    }

    /// An empty list: every 401 is eligible for refresh.
    pub fn none() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    pub fn with(mut self, fragment: impl Into<String>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn matches(&self, path: &str) -> bool {
        let path = strip_query(path).trim_end_matches('/');
        self.fragments
            .iter()
            .any(|fragment| ends_on_segment(path, fragment))
    }
}

fn ends_on_segment(path: &str, fragment: &str) -> bool {
    let fragment = fragment.trim_matches('/');
    if fragment.is_empty() {
        return false;
    }
    match path.strip_suffix(fragment) {
        Some(prefix) => prefix.is_empty() || prefix.ends_with('/'),
        None => false,
    }
}
