//! Shared test helpers: a session client wired to a wiremock backend.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use authgate::client::SessionClient;
use authgate::config::SessionConfig;
use authgate::http::ReqwestTransport;
use authgate::navigation::HistoryNavigator;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn config_for(server: &MockServer) -> SessionConfig {
    SessionConfig::builder()
        .api_url(server.uri())
        .bootstrap_timeout(Duration::from_secs(2))
        .build()
}

/// Client over a real cookie-keeping transport, starting on `start_path`.
pub fn client_with(
    config: SessionConfig,
    start_path: &str,
) -> (SessionClient, Arc<HistoryNavigator>) {
    let transport = Arc::new(ReqwestTransport::new(config.clone()).expect("transport"));
    let navigator = Arc::new(HistoryNavigator::new(start_path));
    let client = SessionClient::with_parts(config, transport, navigator.clone());
    (client, navigator)
}

pub fn client_for(server: &MockServer, start_path: &str) -> (SessionClient, Arc<HistoryNavigator>) {
    client_with(config_for(server), start_path)
}

/// `verify-token/`, `users/me/` and `users/is-email-verified/` for an
/// established session.
pub async fn mount_session(server: &MockServer, role: &str, email_verified: bool) {
    Mock::given(method("GET"))
        .and(path("/verify-token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "User is authenticated"})),
        )
        .mount(server)
        .await;
    mount_profile(server, json!({"username": "alice", "role": role})).await;
    mount_email_verified(server, email_verified).await;
}

pub async fn mount_profile(server: &MockServer, profile: Value) {
    Mock::given(method("GET"))
        .and(path("/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile))
        .mount(server)
        .await;
}

pub async fn mount_email_verified(server: &MockServer, email_verified: bool) {
    Mock::given(method("GET"))
        .and(path("/users/is-email-verified/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"email_verified": email_verified})),
        )
        .mount(server)
        .await;
}

pub async fn mount_token(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"detail": "token"})))
        .mount(server)
        .await;
}
