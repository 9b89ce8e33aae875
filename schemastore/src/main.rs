//! `schemastore` binary: loads configuration, connects the configured driver and
//! serves the REST API.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use schemastore::{config::AppConfig, manager::Manager, rest};

#[derive(Parser)]
#[command(
    name = "schemastore",
    version,
    about = "Schema-validated JSON document store",
    long_about = "Stores JSON items in named collections, validating every item against the \
                  collection's JSON Schema, and exposes the store over a REST API."
)]
struct Cli {
    /// Configuration file (default: ~/.schemastore.yaml, then ./.schemastore.yaml)
    #[arg(long, global = true, env = "SCHEMASTORE_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Connect the configured storage driver and serve the REST API (default)
    Serve,
    /// List the storage drivers compiled into this build
    Drivers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.config).await,
        Command::Drivers => {
            for name in schemastore::registry().drivers() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    init_tracing();

    let (config, path) = AppConfig::load(config_path.as_deref())
        .context("unable to load configuration")?;
    info!(path = %path.display(), name = %config.short_name, "loaded configuration");

    if !config.is_production {
        info!(
            "development mode, configuration:\n{}",
            serde_json::to_string_pretty(&config)?
        );
    }

    let registry = schemastore::registry();
    let backend = registry
        .connect(&config.db_config.driver_type, &config.db_config)
        .await
        .with_context(|| {
            format!(
                "unable to initialize storage driver {:?}",
                config.db_config.driver_type
            )
        })?;

    let manager = Manager::builder()
        .with_backend(backend)
        .build()
        .context("unable to initialize manager")?;
    let manager = Arc::new(manager);

    rest::serve(Arc::clone(&manager), config.bind)
        .await
        .with_context(|| format!("REST server failed on {}", config.bind))?;

    match Arc::try_unwrap(manager) {
        Ok(manager) => manager.shutdown().await.context("storage shutdown failed")?,
        Err(_) => warn!("manager still shared at exit, skipping backend shutdown"),
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}
