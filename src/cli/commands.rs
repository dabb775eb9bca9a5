//! CLI command handlers for status, login, and fetch.

use futures::future::join_all;

use crate::client::{Credentials, SessionClient};
use crate::config::SessionConfig;
use crate::http::ApiRequest;

fn client(api_url: Option<String>) -> Result<SessionClient, Box<dyn std::error::Error>> {
    let mut config = SessionConfig::from_env();
    if let Some(url) = api_url {
        config = config.with_api_url(url);
    }
    Ok(SessionClient::new(config)?)
}

/// Handle `authgate status`.
pub async fn handle_status(api_url: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let client = client(api_url)?;
    // the bootstrapper skips the landing route, so probe from the home route
    client.navigator().navigate(&client.config().routes.home);
    client.bootstrap().await;

    let state = client.current_session();
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

/// Handle `authgate login <identifier>`.
pub async fn handle_login(
    api_url: Option<String>,
    identifier: &str,
    password: &str,
    remember: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = client(api_url)?;
    let credentials = Credentials::new(identifier, password).remember(remember);
    let outcome = client.login(&credentials).await?;

    println!("✅ Logged in as {}", credentials.identifier);
    if let Some(role) = outcome.profile.role() {
        println!("   Role: {role}");
    }
    println!("   Email verified: {}", outcome.email_verified);
    println!("   Next: {}", outcome.route);
    Ok(())
}

/// Handle `authgate fetch <identifier> <path>...`.
pub async fn handle_fetch(
    api_url: Option<String>,
    identifier: &str,
    password: &str,
    paths: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let client = client(api_url)?;
    client.login(&Credentials::new(identifier, password)).await?;

    let requests = paths.iter().map(|path| {
        let client = client.clone();
        let path = path.clone();
        async move {
            let result = client.execute(ApiRequest::get(path.clone())).await;
            (path, result)
        }
    });

    let mut failures = 0usize;
    for (path, result) in join_all(requests).await {
        match result {
            Ok(response) => println!("✅ {path} → {}", response.status),
            Err(e) => {
                failures += 1;
                println!("❌ {path} → {e}");
            }
        }
    }
    println!(
        "   Refreshes started: {}",
        client.coordinator().refreshes_started()
    );

    if failures > 0 {
        return Err(format!("{failures} of {} requests failed", paths.len()).into());
    }
    Ok(())
}
