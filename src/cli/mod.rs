//! CLI entry point for authgate.

pub mod commands;

use clap::{Parser, Subcommand};

/// authgate CLI
#[derive(Parser, Debug)]
#[command(name = "authgate", version, about = "Session checks against a cookie-authenticated API")]
pub struct Cli {
    /// Base URL of the API (overrides AUTHGATE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bootstrap a session and print the resulting state
    Status,
    /// Log in and report where the application would go next
    Login(LoginArgs),
    /// Log in, then fetch paths concurrently through the refresh coordinator
    Fetch(FetchArgs),
}

/// Arguments for `authgate login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Username or email address
    pub identifier: String,

    /// Password
    #[arg(short, long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Request long-lived cookies
    #[arg(long)]
    pub remember: bool,
}

/// Arguments for `authgate fetch`.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Username or email address
    pub identifier: String,

    /// API paths to GET, relative to the base URL
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Password
    #[arg(short, long, env = "AUTHGATE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_status() {
        let cli = Cli::try_parse_from(["authgate", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert!(cli.api_url.is_none());
    }

    #[test]
    fn parse_login_with_all_options() {
        let cli = Cli::try_parse_from([
            "authgate",
            "--api-url",
            "http://api.test/",
            "login",
            "alice@example.com",
            "-p",
            "secret",
            "--remember",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://api.test/"));
        match cli.command {
            Commands::Login(args) => {
                assert_eq!(args.identifier, "alice@example.com");
                assert_eq!(args.password, "secret");
                assert!(args.remember);
            }
            other => panic!("expected Login, got {other:?}"),
        }
    }

    #[test]
    fn parse_fetch_collects_paths() {
        let cli = Cli::try_parse_from([
            "authgate",
            "fetch",
            "alice",
            "dashboards/",
            "reports/",
            "--password",
            "secret",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.identifier, "alice");
                assert_eq!(args.paths, vec!["dashboards/", "reports/"]);
            }
            other => panic!("expected Fetch, got {other:?}"),
        }
    }

    #[test]
    fn parse_fetch_without_paths_is_error() {
        assert!(Cli::try_parse_from(["authgate", "fetch", "alice", "-p", "x"]).is_err());
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["authgate"]).is_err());
    }
}
