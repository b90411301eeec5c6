//! Converse - conversational AI chat CLI
//!
#![doc = "Converse - conversational AI chat CLI"]
#![doc = "Main entry point for the Converse application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use converse::cli::{Cli, Commands};
use converse::commands;
use converse::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let cli = Cli::parse_args();

    // If the user supplied a storage path on the CLI, mirror it into
    // CONVERSE_HISTORY_DB so the storage initializer can pick it up.
    // This keeps callers unchanged while allowing `ChatStore::new()` to
    // honor an override.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("CONVERSE_HISTORY_DB", db_path);
        tracing::info!("Using storage DB override from CLI: {}", db_path);
    }

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat {
            proxy_url,
            owner,
            resume,
        } => {
            tracing::info!("Starting chat session");
            if let Some(url) = &proxy_url {
                tracing::debug!("Using proxy override: {}", url);
            }
            if let Some(id) = &resume {
                tracing::debug!("Resuming conversation: {}", id);
            }

            commands::chat::run_chat(config, proxy_url, owner, resume).await?;
            Ok(())
        }
        Commands::Serve { bind } => {
            tracing::info!("Starting completion proxy service");
            commands::serve::run_serve(config, bind).await?;
            Ok(())
        }
        Commands::History { command } => {
            tracing::info!("Starting history command");
            commands::history::handle_history(&config, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("converse=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
