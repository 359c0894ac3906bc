//! lexis CLI - cached dictionary lookups
//!
//! Opens the entry store, runs one command against it and closes the store
//! before exiting.

use anyhow::{Context, Result};
use clap::Parser;
use lexis_core::{Config, SqliteStore};
use tracing::debug;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};
use utils::logging::initialize_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let config = load_config(&cli)?;
    debug!("Using entry store at {}", config.store.path.display());

    let store = SqliteStore::open(&config.store.path)
        .await
        .with_context(|| format!("failed to open entry store at {}", config.store.path.display()))?;

    let result = execute_command(cli, &config, &store).await;
    store.close().await?;
    result
}

/// Config file and `LEXIS_*` variables, then command-line flags on top.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load()?;
    if let Some(db) = &cli.db {
        config.store.path.clone_from(db);
    }
    if let Some(base_url) = &cli.base_url {
        config.fetch.base_url.clone_from(base_url);
    }
    config.validate()?;
    Ok(config)
}

async fn execute_command(cli: Cli, config: &Config, store: &SqliteStore) -> Result<()> {
    match cli.command {
        Commands::Lookup { word, user, format } => {
            commands::lookup_word(store, config, &word, &user, format).await?;
        },
        Commands::Favorite { entry_id, user } => {
            commands::add_favorite(store, entry_id, &user).await?;
        },
    }

    Ok(())
}
