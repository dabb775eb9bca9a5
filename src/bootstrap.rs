//! Startup check that decides whether an existing session is still valid.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::client::types::{EmailVerification, UserProfile, VerifyResponse, AUTHENTICATED_MESSAGE};
use crate::config::{Endpoints, RouteConfig, SessionConfig};
use crate::error::SessionError;
use crate::http::ApiRequest;
use crate::navigation::Navigator;
use crate::refresh::RefreshCoordinator;
use crate::session::{Role, SessionState, SessionStore};

/// Populates the session store from the backend at startup.
///
/// Fails closed: any error, timeout, or a negative answer leaves the store
/// logged out. The latest attempt clears `loading` when it ends, whatever the
/// outcome; an attempt overtaken by a newer one leaves `loading` to it.
#[derive(Clone)]
pub struct SessionBootstrapper {
    coordinator: RefreshCoordinator,
    navigator: Arc<dyn Navigator>,
    routes: RouteConfig,
    endpoints: Endpoints,
    timeout: Duration,
    attempts: Arc<AtomicU64>,
}

struct Established {
    role: Option<Role>,
    email_verified: bool,
}

impl std::fmt::Debug for SessionBootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBootstrapper")
            .field("routes", &self.routes)
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("attempts", &self.attempts.load(Ordering::SeqCst))
            .finish()
    }
}

impl SessionBootstrapper {
    pub fn new(
        config: &SessionConfig,
        coordinator: RefreshCoordinator,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            coordinator,
            navigator,
            routes: config.routes.clone(),
            endpoints: config.endpoints.clone(),
            timeout: config.bootstrap_timeout,
            attempts: Arc::new(AtomicU64::new(0)),
        }
    }

    fn store(&self) -> &SessionStore {
        self.coordinator.store()
    }

    pub async fn bootstrap(&self) {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let store = self.store();

        if self.routes.is_landing(&self.navigator.current_path()) {
            tracing::debug!("On landing route; skipping session bootstrap");
            store.set_loading(false);
            return;
        }

        let generation = store.generation();
        let outcome = self.probe_within_deadline().await;

        if self.attempts.load(Ordering::SeqCst) != attempt {
            tracing::debug!(attempt, "Bootstrap superseded by a newer attempt");
            return;
        }

        match outcome {
            Ok(Some(established)) => {
                let applied = store.update_if_current(generation, |state| {
                    state.authenticated = true;
                    state.role = established.role;
                    state.email_verified = established.email_verified;
                    state.login_flow_completed = true;
                });
                if !applied {
                    tracing::debug!("Session changed during bootstrap; result discarded");
                }
            }
            Ok(None) => {
                tracing::debug!("No valid session");
                store.update_if_current(generation, SessionState::clear_identity);
            }
            Err(error) => {
                tracing::warn!(error = %error, "Session bootstrap failed; treating as logged out");
                store.update_if_current(generation, SessionState::clear_identity);
            }
        }

        store.set_loading(false);
    }

    async fn probe_within_deadline(&self) -> Result<Option<Established>, SessionError> {
        tokio::time::timeout(self.timeout, self.probe())
            .await
            .unwrap_or_else(|_| Err(SessionError::Timeout(self.timeout.as_millis() as u64)))
    }

    async fn probe(&self) -> Result<Option<Established>, SessionError> {
        let verify: VerifyResponse = self
            .coordinator
            .execute(ApiRequest::get(self.endpoints.verify.clone()))
            .await?
            .json()?;
        if verify.message != AUTHENTICATED_MESSAGE {
            return Ok(None);
        }

        let profile: UserProfile = self
            .coordinator
            .execute(ApiRequest::get(self.endpoints.profile.clone()))
            .await?
            .json()?;
        let verification: EmailVerification = self
            .coordinator
            .execute(ApiRequest::get(self.endpoints.email_verified.clone()))
            .await?
            .json()?;

        Ok(Some(Established {
            role: profile.role(),
            email_verified: verification.email_verified,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use reqwest::StatusCode;

    use crate::error::HttpError;
    use crate::http::{ApiResponse, Transport};
    use crate::navigation::HistoryNavigator;

    /// Answers the probe endpoints; the n-th `verify-token/` call waits
    /// `verify_delays[n]`.
    struct SlowBackend {
        verify_delays: Vec<Duration>,
        verify_calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for SlowBackend {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
            let body = match request.path.as_str() {
                "verify-token/" => {
                    let call = self.verify_calls.fetch_add(1, Ordering::SeqCst);
                    let delay = self.verify_delays.get(call).copied().unwrap_or_default();
                    tokio::time::sleep(delay).await;
                    r#"{"message":"User is authenticated"}"#
                }
                "users/me/" => r#"{"username":"alice","role":"user"}"#,
                "users/is-email-verified/" => r#"{"email_verified":true}"#,
                _ => return Ok(ApiResponse::new(StatusCode::NOT_FOUND, "")),
            };
            Ok(ApiResponse::new(StatusCode::OK, body))
        }

        fn clear_cookies(&self) {}
    }

    fn bootstrapper(verify_delays: Vec<Duration>, timeout: Duration) -> SessionBootstrapper {
        let config = SessionConfig::builder().bootstrap_timeout(timeout).build();
        let navigator: Arc<dyn Navigator> = Arc::new(HistoryNavigator::new("/dashboards"));
        let backend = Arc::new(SlowBackend {
            verify_delays,
            verify_calls: AtomicUsize::new(0),
        });
        let coordinator = RefreshCoordinator::new(
            &config,
            backend,
            SessionStore::new(),
            Arc::clone(&navigator),
        );
        SessionBootstrapper::new(&config, coordinator, navigator)
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_latest_attempt_clears_loading() {
        let bootstrapper = bootstrapper(
            vec![Duration::from_millis(50), Duration::from_millis(200)],
            Duration::from_secs(1),
        );
        let store = bootstrapper.store().clone();

        let first = tokio::spawn({
            let bootstrapper = bootstrapper.clone();
            async move { bootstrapper.bootstrap().await }
        });
        tokio::task::yield_now().await;
        let second = tokio::spawn({
            let bootstrapper = bootstrapper.clone();
            async move { bootstrapper.bootstrap().await }
        });

        first.await.unwrap();
        assert!(store.get().loading);

        second.await.unwrap();
        let state = store.get();
        assert!(!state.loading);
        assert!(state.authenticated);
        assert_eq!(state.role, Some(Role::User));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_fails_closed() {
        let bootstrapper = bootstrapper(vec![Duration::from_secs(30)], Duration::from_secs(1));
        bootstrapper.bootstrap().await;

        let state = bootstrapper.store().get();
        assert!(!state.loading);
        assert!(!state.authenticated);
    }
}
