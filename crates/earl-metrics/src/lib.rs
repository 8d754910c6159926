//! earl-metrics — retrieve a table's consumed capacity as a point series.
//!
//! The fetcher asks a [`MetricDataClient`] for per-minute `Sum`
//! statistics over a trailing window (seven days by default), converts
//! them to units per second, and drops the final sample, which the
//! monitoring service reports before its minute has closed.
//!
//! Clients are registered per region and passed in explicitly; nothing
//! is resolved from ambient credentials or process-wide defaults.

pub mod client;
pub mod error;
pub mod fetcher;
pub mod query;

pub use client::{MetricDataClient, MetricDataFuture, MetricDataResult, RecordingClient};
pub use error::{MetricsError, MetricsResult};
pub use fetcher::MetricsFetcher;
pub use query::{CapacityMetric, Dimension, MetricDataRequest, MetricQuery};
