//! earl — estimate what autoscaling would have done to a table.
//!
//! # Usage
//!
//! ```text
//! earl fetch --recording raw.json --table orders --until 2024-05-01T00:00:00Z --out orders.json
//! earl simulate --series orders.json --config earl.toml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "earl",
    about = "Earl — autoscaling and cost estimator for provisioned capacity",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an earl.toml scaffold
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
        /// Minimum provisioned capacity
        #[arg(long, default_value = "5")]
        min: f64,
        /// Maximum provisioned capacity
        #[arg(long, default_value = "40000")]
        max: f64,
    },
    /// Densify a CSV export to one sample per minute
    Ingest {
        /// CSV file with `time` and `value` columns
        #[arg(long)]
        csv: PathBuf,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Replay consumption through an autoscaling policy and price it
    Simulate(commands::simulate::SimulateArgs),
    /// Fetch a table's consumed capacity
    Fetch(commands::fetch::FetchArgs),
}

/// Log filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "earl=info";

/// Build the log filter from a `RUST_LOG` value, falling back to
/// [`DEFAULT_LOG_FILTER`].
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path, min, max } => commands::init::init(&path, min, max),
        Commands::Ingest { csv, format } => commands::ingest::ingest(&csv, &format),
        Commands::Simulate(args) => commands::simulate::simulate(args),
        Commands::Fetch(args) => commands::fetch::fetch(args).await,
    }
}
