//! Session-aware API client: login, logout, bootstrap and guarded access.

pub mod types;

pub use types::{Credentials, LoginOutcome, NextStep, UserProfile};

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::bootstrap::SessionBootstrapper;
use crate::config::SessionConfig;
use crate::error::{HttpError, Result, SessionError};
use crate::guard::{RequireAuthenticated, RequireRole};
use crate::http::{ApiRequest, ApiResponse, ReqwestTransport, Transport};
use crate::navigation::{HistoryNavigator, Navigator};
use crate::refresh::RefreshCoordinator;
use crate::session::{Role, SessionState, SessionStore};
use types::EmailVerification;

/// Facade over the session layer.
///
/// Every request goes through the [`RefreshCoordinator`], so page code never
/// sees an expired session unless the refresh itself failed.
///
/// # Example
/// ```no_run
/// use authgate::client::{Credentials, SessionClient};
/// use authgate::config::SessionConfig;
///
/// # async fn example() -> authgate::error::Result<()> {
/// let client = SessionClient::new(SessionConfig::from_env())?;
/// client.bootstrap().await;
/// if !client.current_session().authenticated {
///     let outcome = client.login(&Credentials::new("alice@example.com", "secret")).await?;
///     println!("next: {}", outcome.route);
/// }
/// let dashboards: serde_json::Value = client.get_json("dashboards/").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionClient {
    config: SessionConfig,
    coordinator: RefreshCoordinator,
    bootstrapper: SessionBootstrapper,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("config", &self.config)
            .field("coordinator", &self.coordinator)
            .field("current_path", &self.navigator.current_path())
            .finish()
    }
}

impl SessionClient {
    /// Client over a cookie-keeping `reqwest` transport, starting on the
    /// landing route of an in-memory navigator.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.clone())?);
        let navigator = Arc::new(HistoryNavigator::new(config.routes.landing.clone()));
        Ok(Self::with_parts(config, transport, navigator))
    }

    pub fn with_parts(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_store(config, transport, navigator, SessionStore::new())
    }

    /// Build around an existing store handle, e.g. one the UI already observes.
    pub fn with_store(
        config: SessionConfig,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        store: SessionStore,
    ) -> Self {
        let coordinator =
            RefreshCoordinator::new(&config, transport, store, Arc::clone(&navigator));
        let bootstrapper =
            SessionBootstrapper::new(&config, coordinator.clone(), Arc::clone(&navigator));
        Self {
            config,
            coordinator,
            bootstrapper,
            navigator,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        self.coordinator.store()
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn current_session(&self) -> SessionState {
        self.store().get()
    }

    /// Run the startup session check. Never fails; see [`SessionBootstrapper`].
    pub async fn bootstrap(&self) {
        self.bootstrapper.bootstrap().await;
    }

    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.coordinator.execute(request).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(self.execute(ApiRequest::get(path)).await?.json()?)
    }

    /// Credential exchange, then role and verification fetch.
    ///
    /// On success the navigator is sent to the route matching
    /// [`LoginOutcome::next`]. Any failure, including rejected credentials,
    /// leaves the store logged out.
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome> {
        let store = self.store();
        let generation = store.begin_login();

        let exchange = ApiRequest::post(self.config.endpoints.token.clone())
            .with_form(credentials.form_fields());
        let outcome = match self.execute(exchange).await {
            Ok(_) => self.complete_login(generation).await,
            Err(SessionError::Http(HttpError::Status { status: 401, .. })) => {
                tracing::debug!(identifier = %credentials.identifier, "Credentials rejected");
                Err(SessionError::InvalidCredentials)
            }
            Err(error) => Err(error),
        };

        if let Err(error) = &outcome {
            if !matches!(error, SessionError::Superseded) {
                tracing::warn!(error = %error, "Login failed; clearing session");
                store.update_if_current(generation, SessionState::clear_identity);
            }
        }
        outcome
    }

    async fn complete_login(&self, generation: u64) -> Result<LoginOutcome> {
        let store = self.store();
        let endpoints = &self.config.endpoints;
        let routes = &self.config.routes;

        apply(store, generation, |state| state.authenticated = true)?;

        let profile: UserProfile = self.get_json(&endpoints.profile).await?;
        let role = profile.role();
        apply(store, generation, |state| state.role = role)?;

        let verification: EmailVerification = self.get_json(&endpoints.email_verified).await?;
        let email_verified = verification.email_verified;
        apply(store, generation, |state| {
            state.email_verified = email_verified;
            state.login_flow_completed = true;
        })?;

        let next = if profile.requires_password_update.unwrap_or(false) {
            NextStep::ChangePassword
        } else if !email_verified {
            NextStep::VerifyEmail
        } else {
            NextStep::Home
        };
        let route = match next {
            NextStep::ChangePassword => routes.change_password.clone(),
            NextStep::VerifyEmail => routes.verify_email.clone(),
            NextStep::Home => routes.home.clone(),
        };
        self.navigator.navigate(&route);

        Ok(LoginOutcome {
            profile,
            email_verified,
            next,
            route,
        })
    }

    /// Invalidate the session on the server, drop local cookies, reset state
    /// and return to the landing route.
    ///
    /// The server call is best effort: the local session is cleared even if
    /// it fails.
    pub async fn logout(&self) {
        let request = ApiRequest::post(self.config.endpoints.logout.clone());
        let transport = self.coordinator.transport();
        let invalidated = transport
            .send(&request)
            .await
            .and_then(ApiResponse::into_result);
        if let Err(error) = invalidated {
            tracing::warn!(error = %error, "Server-side logout failed; clearing local session anyway");
        }
        transport.clear_cookies();
        self.store().reset();
        self.navigator.navigate(&self.config.routes.landing);
    }

    pub fn require_authenticated(&self) -> RequireAuthenticated {
        RequireAuthenticated::new(self.config.routes.clone())
    }

    pub fn require_role(&self, role: Role) -> RequireRole {
        RequireRole::new(role, self.config.routes.clone())
    }
}

fn apply(
    store: &SessionStore,
    generation: u64,
    update: impl FnOnce(&mut SessionState),
) -> Result<()> {
    if store.update_if_current(generation, update) {
        Ok(())
    } else {
        Err(SessionError::Superseded)
    }
}
