use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{TimeDelta, Utc};
use clap::Args;
use tracing::info;

use earl_core::EarlConfig;
use earl_metrics::{CapacityMetric, MetricQuery, MetricsFetcher, RecordingClient};

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// JSON recording of raw per-minute sums to replay
    #[arg(long)]
    pub recording: PathBuf,
    /// Table name
    #[arg(short, long)]
    pub table: String,
    /// Global secondary index name
    #[arg(short, long)]
    pub index: Option<String>,
    /// Metric: read or write
    #[arg(short, long, default_value = "write")]
    pub metric: String,
    /// Region; defaults to the config's default_region
    #[arg(short, long)]
    pub region: Option<String>,
    /// earl.toml holding the metrics settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// End of the fetch window (defaults to now)
    #[arg(long)]
    pub until: Option<String>,
    /// Write the series here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn fetch(args: FetchArgs) -> anyhow::Result<()> {
    let config = args
        .config
        .as_deref()
        .map(EarlConfig::from_file)
        .transpose()
        .context("loading config")?;
    let metrics = config.as_ref().and_then(|c| c.metrics.as_ref());

    let region = args
        .region
        .clone()
        .or_else(|| metrics.and_then(|m| m.default_region.clone()))
        .context("no region given and no default_region configured")?;

    let regions = match metrics {
        Some(m) if !m.regions.is_empty() => m.regions.clone(),
        _ => vec![region.clone()],
    };
    let window_days = metrics.map_or(7, |m| m.window_days);

    let client = Arc::new(RecordingClient::new(&args.recording));
    let fetcher = regions.into_iter().fold(
        MetricsFetcher::new(TimeDelta::days(i64::from(window_days))),
        |fetcher, r| fetcher.with_client(r, client.clone()),
    );

    let until = match &args.until {
        Some(s) => earl_ingest::parse_timestamp(s)
            .with_context(|| format!("invalid --until timestamp {s:?}"))?,
        None => Utc::now(),
    };

    let query = MetricQuery {
        table: args.table.clone(),
        index: args.index.clone(),
        metric: args
            .metric
            .parse::<CapacityMetric>()
            .map_err(anyhow::Error::msg)?,
        region,
    };

    let points = fetcher.fetch(&query, until).await?;
    let json = serde_json::to_string_pretty(&points)?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, json)?;
            info!(points = points.len(), path = %path.display(), "series written");
            println!("✓ Wrote {} points to {}", points.len(), path.display());
        }
        None => println!("{json}"),
    }

    Ok(())
}
