use std::sync::RwLock;

use async_trait::async_trait;

use super::request::{ApiRequest, RequestBody};
use super::response::ApiResponse;
use crate::config::SessionConfig;
use crate::error::{HttpError, SessionError};

/// The raw HTTP seam beneath the refresh coordinator.
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status; only failures to exchange or read a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError>;

    /// Forget every session cookie held on the client side.
    fn clear_cookies(&self);
}

/// `reqwest`-backed transport with a cookie jar.
///
/// The server manages `access_token` / `refresh_token` as cookies; the jar
/// stores and replays them without the client ever reading their values.
pub struct ReqwestTransport {
    config: SessionConfig,
    client: RwLock<reqwest::Client>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("api_url", &self.config.api_url)
            .finish()
    }
}

impl ReqwestTransport {
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let client = build_client(&config)?;
        Ok(Self {
            config,
            client: RwLock::new(client),
        })
    }

    fn client(&self) -> reqwest::Client {
        match self.client.read() {
            Ok(client) => client.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, HttpError> {
        let url = self.config.url_for(&request.path);
        let builder = self
            .client()
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(pairs) => builder.form(pairs),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    fn clear_cookies(&self) {
        // reqwest's jar cannot be emptied in place; swap in a client with a
        // fresh one.
        match build_client(&self.config) {
            Ok(fresh) => {
                let mut client = match self.client.write() {
                    Ok(client) => client,
                    Err(poisoned) => poisoned.into_inner(),
                };
                *client = fresh;
            }
            Err(error) => {
                tracing::warn!(error = %error, "Could not rebuild HTTP client; cookies kept");
            }
        }
    }
}

fn build_client(config: &SessionConfig) -> Result<reqwest::Client, SessionError> {
    reqwest::Client::builder()
        .cookie_store(true)
        .timeout(config.request_timeout)
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| SessionError::Configuration(format!("Failed to build HTTP client: {e}")))
}
