//! Command-line catalog of the built-in flowkit definitions.

mod builtin;
mod catalog;
mod config;
mod error;

use crate::catalog::Catalog;
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use clap::{Parser, Subcommand};
use rootcause::prelude::Report;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every trigger and action as JSON
    List,
    /// Print one definition as JSON
    Describe {
        /// Definition id
        id: String,
    },
    /// Mock-run a definition and print the produced items
    Mock {
        /// Definition id
        id: String,
        /// Configuration as a JSON object
        #[arg(default_value = "{}")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Report<CatalogError>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CatalogConfig::from_env().map_err(|e| CatalogError::Config {
        details: e.to_string(),
    })?;
    tracing::debug!(
        platform = %config.platform_name,
        strict = config.strict_config,
        "loaded configuration"
    );

    let catalog = Catalog::builtin(config)?;

    match cli.command {
        Command::List => print_json(&catalog.listing()),
        Command::Describe { id } => print_json(&catalog.describe(&id)?),
        Command::Mock { id, config } => print_json(&catalog.mock(&id, &config).await?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Report<CatalogError>> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| CatalogError::Output {
        details: e.to_string(),
    })?;
    println!("{rendered}");
    Ok(())
}
