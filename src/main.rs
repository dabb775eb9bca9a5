//! authgate CLI binary entry point.

use authgate::cli::{commands, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    let result = match cli.command {
        Commands::Status => commands::handle_status(cli.api_url).await,
        Commands::Login(args) => {
            commands::handle_login(cli.api_url, &args.identifier, &args.password, args.remember)
                .await
        }
        Commands::Fetch(args) => {
            commands::handle_fetch(cli.api_url, &args.identifier, &args.password, &args.paths)
                .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
