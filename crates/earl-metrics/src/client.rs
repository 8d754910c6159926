//! Metrics client seam and the offline recording client.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::query::MetricDataRequest;

/// Raw statistics returned by a metrics service: parallel timestamp and
/// value arrays, one entry per period, in no guaranteed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDataResult {
    pub timestamps: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

impl MetricDataResult {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Boxed future returned by [`MetricDataClient::get_metric_data`].
pub type MetricDataFuture<'a> =
    Pin<Box<dyn Future<Output = anyhow::Result<MetricDataResult>> + Send + 'a>>;

/// Transport to a metrics service for one region.
///
/// Retries, if any, are the implementation's concern.
pub trait MetricDataClient: Send + Sync {
    fn get_metric_data<'a>(&'a self, request: &'a MetricDataRequest) -> MetricDataFuture<'a>;
}

/// Replays a JSON recording of a [`MetricDataResult`], returning only the
/// samples inside the requested window.
#[derive(Debug, Clone)]
pub struct RecordingClient {
    path: PathBuf,
}

impl RecordingClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetricDataClient for RecordingClient {
    fn get_metric_data<'a>(&'a self, request: &'a MetricDataRequest) -> MetricDataFuture<'a> {
        Box::pin(async move {
            let raw = tokio::fs::read_to_string(&self.path)
                .await
                .with_context(|| format!("reading recording {}", self.path.display()))?;
            let recorded: MetricDataResult = serde_json::from_str(&raw)
                .with_context(|| format!("parsing recording {}", self.path.display()))?;

            anyhow::ensure!(
                recorded.timestamps.len() == recorded.values.len(),
                "recording has {} timestamps but {} values",
                recorded.timestamps.len(),
                recorded.values.len()
            );

            let mut result = MetricDataResult::default();
            for (time, value) in recorded.timestamps.into_iter().zip(recorded.values) {
                if time >= request.start && time < request.end {
                    result.timestamps.push(time);
                    result.values.push(value);
                }
            }

            debug!(
                path = %self.path.display(),
                samples = result.timestamps.len(),
                "replayed metrics recording"
            );
            Ok(result)
        })
    }
}
