//! CMS Routes - Entry Point
//!
//! Initializes logging, loads configuration, and either starts the HTTP
//! server or prints the route table.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cms_routes::{
    config::{Config, LoggingConfig},
    models::RouteSummary,
    routes, run, ActionRegistry,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// CMS admin panel and frontend route server
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file (defaults to config.local.toml, then config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the route table
    Routes {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let config = match &cli.config {
                Some(path) => Config::load(path)?,
                None => Config::load_default()?,
            };

            init_logging(&config.logging)?;

            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                "Starting CMS route server"
            );

            // Controller actions are registered by the embedding application;
            // the standalone binary serves the table with none.
            run(config, ActionRegistry::new()).await
        }
        Command::Routes { json } => print_routes(json),
    }
}

fn print_routes(json: bool) -> anyhow::Result<()> {
    let table = routes::load()?;
    let summaries: Vec<RouteSummary> = table.routes().map(|r| RouteSummary::from_entry(r)).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            println!("{}", summary.to_line());
        }
        println!("{} routes", summaries.len());
    }

    Ok(())
}

/// Initialize logging based on configuration
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json())
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .try_init()?;
        }
    }

    Ok(())
}
