//! Metrics fetcher: turns raw per-minute sums into a consumption series.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};

use earl_core::{EarlError, Point};

use crate::client::MetricDataClient;
use crate::error::{MetricsError, MetricsResult};
use crate::query::{MetricDataRequest, MetricQuery, PERIOD_SECS};

/// Default trailing window fetched for a table.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Fetches consumed capacity through per-region clients.
pub struct MetricsFetcher {
    /// Region → client.
    clients: HashMap<String, Arc<dyn MetricDataClient>>,
    /// How far back from `now` to fetch.
    window: TimeDelta,
}

impl MetricsFetcher {
    /// Create a fetcher with no regions configured.
    pub fn new(window: TimeDelta) -> Self {
        Self {
            clients: HashMap::new(),
            window,
        }
    }

    /// Register the client used for `region`.
    pub fn with_client(mut self, region: impl Into<String>, client: Arc<dyn MetricDataClient>) -> Self {
        self.clients.insert(region.into(), client);
        self
    }

    /// Configured regions, sorted.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        regions.sort_unstable();
        regions
    }

    /// Fetch the consumption series for `query` over the window ending at `now`.
    ///
    /// Values are converted from per-minute sums to units per second. The
    /// result is ascending and duplicate-free, with the final (still
    /// incomplete) sample removed.
    pub async fn fetch(&self, query: &MetricQuery, now: DateTime<Utc>) -> MetricsResult<Vec<Point>> {
        let client = self
            .clients
            .get(&query.region)
            .ok_or_else(|| MetricsError::RegionNotConfigured {
                region: query.region.clone(),
                configured: self.regions().into_iter().map(str::to_string).collect(),
            })?;

        let start = now
            .checked_sub_signed(self.window)
            .ok_or_else(|| EarlError::invalid("metrics window reaches before the epoch range"))?;
        let request = MetricDataRequest::for_query(query, start, now);

        info!(
            table = %query.table,
            index = query.index.as_deref().unwrap_or("-"),
            metric = %query.metric,
            region = %query.region,
            "fetching consumed capacity"
        );

        let raw = client.get_metric_data(&request).await?;
        if raw.is_empty() {
            return Err(no_data(query).into());
        }
        if raw.timestamps.len() != raw.values.len() {
            return Err(anyhow::anyhow!(
                "metrics client returned {} timestamps but {} values",
                raw.timestamps.len(),
                raw.values.len()
            )
            .into());
        }

        let per_period = f64::from(PERIOD_SECS);
        let mut points: Vec<Point> = raw
            .timestamps
            .into_iter()
            .zip(raw.values)
            .map(|(time, sum)| Point::new(time, sum / per_period))
            .collect();

        points.sort_by_key(|p| p.time);
        points.dedup_by_key(|p| p.time);

        // The newest period is still accumulating, whatever its value.
        points.pop();

        let before = points.len();
        points.retain(|p| p.value.is_finite() && p.value >= 0.0);
        if points.len() != before {
            warn!(
                dropped = before - points.len(),
                "dropped unusable samples"
            );
        }

        if points.is_empty() {
            return Err(no_data(query).into());
        }

        debug!(points = points.len(), "consumed capacity fetched");
        Ok(points)
    }
}

fn no_data(query: &MetricQuery) -> EarlError {
    EarlError::NoData(format!(
        "{} returned no samples for table {}",
        query.metric, query.table
    ))
}
