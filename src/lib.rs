//! authgate: client-side session coordinator for cookie-authenticated APIs.
//!
//! Keeps a shared [`SessionStore`](session::SessionStore), renews expired
//! sessions with a single-flight refresh that replays the requests that hit
//! the expiry, bootstraps session state at startup, and decides which routes
//! may render.
//!
//! # Quick Start
//!
//! ```no_run
//! use authgate::prelude::*;
//!
//! # async fn example() -> authgate::error::Result<()> {
//! let client = SessionClient::new(SessionConfig::from_env())?;
//! client.bootstrap().await;
//! client.login(&Credentials::new("alice", "secret")).await?;
//!
//! let guard = client.require_authenticated();
//! let view = guard.render(client.store(), client.navigator().as_ref(), || "dashboards");
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod navigation;
pub mod prelude;
pub mod refresh;
pub mod session;

#[cfg(feature = "cli")]
pub mod cli;
