use std::sync::Arc;

use reqwest::StatusCode;

use super::exclusion::ExclusionList;
use super::single_flight::RefreshFlight;
use crate::config::{RouteConfig, SessionConfig};
use crate::error::{HttpError, RefreshFailure, SessionError};
use crate::http::{ApiRequest, ApiResponse, Transport};
use crate::navigation::Navigator;
use crate::session::SessionStore;

/// What the coordinator does with a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Hand the failure to the caller untouched.
    PassThrough(PassReason),
    /// Refresh the session and replay the request.
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    NotUnauthorized,
    Excluded,
    AlreadyRetried,
}

/// HTTP middleware that renews an expired session and replays the request.
///
/// Wraps a [`Transport`]. Successful responses pass straight through. A 401
/// on a non-excluded, not-yet-retried request joins the single outstanding
/// refresh; on success the request is replayed once, on failure the session
/// store is reset and the navigator sent to the login route (once per
/// refresh, not once per waiting request).
///
/// Clones share the same refresh slot.
#[derive(Clone)]
pub struct RefreshCoordinator {
    transport: Arc<dyn Transport>,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    routes: RouteConfig,
    exclusions: ExclusionList,
    refresh_path: String,
    flight: RefreshFlight,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_path", &self.refresh_path)
            .field("exclusions", &self.exclusions)
            .field("flight", &self.flight)
            .finish()
    }
}

impl RefreshCoordinator {
    pub fn new(
        config: &SessionConfig,
        transport: Arc<dyn Transport>,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            store,
            navigator,
            routes: config.routes.clone(),
            exclusions: config.exclusions.clone(),
            refresh_path: config.endpoints.refresh.clone(),
            flight: RefreshFlight::new(),
        }
    }

    /// Send `request`, refreshing and replaying once on an expired session.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let response = self.transport.send(&request).await?;
        if response.is_success() {
            return Ok(response);
        }

        match self.classify(&request, response.status) {
            Interception::PassThrough(reason) => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status.as_u16(),
                    ?reason,
                    "Passing failed response through"
                );
                Err(HttpError::Status {
                    status: response.status.as_u16(),
                    body: response.body,
                }
                .into())
            }
            Interception::Refresh => {
                request.mark_retried();
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    "Session expired; joining refresh"
                );
                self.refresh().await?;
                let replay = self.transport.send(&request).await?;
                Ok(replay.into_result()?)
            }
        }
    }

    /// Decide whether a failed response warrants a refresh.
    pub fn classify(&self, request: &ApiRequest, status: StatusCode) -> Interception {
        if status != StatusCode::UNAUTHORIZED {
            Interception::PassThrough(PassReason::NotUnauthorized)
        } else if self.exclusions.matches(&request.path) {
            Interception::PassThrough(PassReason::Excluded)
        } else if request.is_retried() {
            Interception::PassThrough(PassReason::AlreadyRetried)
        } else {
            Interception::Refresh
        }
    }

    /// Join the outstanding refresh or start one.
    ///
    /// A failed refresh only tears the session down if no login or reset
    /// happened since the refresh started.
    pub async fn refresh(&self) -> Result<(), RefreshFailure> {
        let transport = Arc::clone(&self.transport);
        let store = self.store.clone();
        let navigator = Arc::clone(&self.navigator);
        let routes = self.routes.clone();
        let request = ApiRequest::post(self.refresh_path.clone());

        self.flight
            .join(move || {
                let generation = store.generation();
                async move {
                    let outcome = match transport.send(&request).await {
                        Ok(response) if response.is_success() => Ok(()),
                        Ok(response) => Err(RefreshFailure::Rejected {
                            status: response.status.as_u16(),
                        }),
                        Err(error) => Err(RefreshFailure::Unreachable(error.to_string())),
                    };

                    match &outcome {
                        Ok(()) => tracing::debug!("Session refreshed"),
                        Err(failure) if store.reset_if_current(generation) => {
                            tracing::warn!(error = %failure, "Session refresh failed; clearing session");
                            if !routes.is_landing(&navigator.current_path()) {
                                navigator.navigate(&routes.login);
                            }
                        }
                        Err(failure) => tracing::debug!(
                            error = %failure,
                            "Session refresh failed after the session changed; keeping it"
                        ),
                    }
                    outcome
                }
            })
            .await
    }

    /// Refreshes started by this coordinator family.
    pub fn refreshes_started(&self) -> u64 {
        self.flight.started()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}
