//! Dayjot - daily journaling CLI
//!
#![doc = "Dayjot - daily journaling CLI"]
#![doc = "Main entry point for the Dayjot application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dayjot::app::{create_auth, AppContext};
use dayjot::cli::{Cli, Commands};
use dayjot::commands;
use dayjot::config::{Config, LoggingConfig};
use dayjot::settings::SettingsStore;
use dayjot::supabase::SupabaseClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Initialize tracing
    init_tracing(&config.logging);
    config.warn_on_defaults(config_path);

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Journal => {
            let ctx = AppContext::from_config(config).await?;
            commands::journal::run_journal(ctx).await
        }
        Commands::Complete { text, file } => {
            tracing::info!("Completing entry");
            let ctx = AppContext::from_config(config).await?;
            commands::complete::run_complete(ctx, text, file).await
        }
        Commands::History { limit, json } => {
            let ctx = AppContext::from_config(config).await?;
            commands::history::handle_history(&ctx, limit, json).await
        }
        Commands::Question { text } => {
            let ctx = AppContext::from_config(config).await?;
            commands::complete::run_question(ctx, text).await
        }
        Commands::Auth { command } => {
            let client = SupabaseClient::new(&config.remote)?;
            let auth = create_auth(&config, &client).await;
            commands::auth::handle_auth(auth.as_ref(), command).await
        }
        Commands::Settings { command } => {
            let mut store = SettingsStore::new()?;
            commands::settings::handle_settings(&mut store, command)
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dayjot={}", logging.level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
