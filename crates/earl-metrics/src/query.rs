//! Metric queries and the requests built from them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace the table metrics are published under.
pub const NAMESPACE: &str = "AWS/DynamoDB";

/// Statistic period in seconds.
pub const PERIOD_SECS: u32 = 60;

/// Statistic requested for each period.
pub const STAT: &str = "Sum";

/// Consumed-capacity metrics a table publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityMetric {
    #[serde(rename = "ConsumedReadCapacityUnits")]
    ConsumedRead,
    #[serde(rename = "ConsumedWriteCapacityUnits")]
    ConsumedWrite,
}

impl CapacityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConsumedRead => "ConsumedReadCapacityUnits",
            Self::ConsumedWrite => "ConsumedWriteCapacityUnits",
        }
    }
}

impl fmt::Display for CapacityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapacityMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" | "consumedreadcapacityunits" => Ok(Self::ConsumedRead),
            "write" | "consumedwritecapacityunits" => Ok(Self::ConsumedWrite),
            other => Err(format!("unknown capacity metric: {other}")),
        }
    }
}

/// Which table (and optionally which index) to fetch consumption for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub table: String,
    /// Global secondary index name, if the index rather than the base
    /// table is being sized.
    pub index: Option<String>,
    pub metric: CapacityMetric,
    pub region: String,
}

/// A metric dimension filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl MetricQuery {
    pub fn dimensions(&self) -> Vec<Dimension> {
        let mut dims = vec![Dimension {
            name: "TableName".to_string(),
            value: self.table.clone(),
        }];
        if let Some(index) = &self.index {
            dims.push(Dimension {
                name: "GlobalSecondaryIndexName".to_string(),
                value: index.clone(),
            });
        }
        dims
    }
}

/// A single statistics request handed to a metrics client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDataRequest {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub period_secs: u32,
    pub stat: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MetricDataRequest {
    /// Per-minute sums of the query's metric between `start` and `end`.
    pub fn for_query(query: &MetricQuery, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            namespace: NAMESPACE.to_string(),
            metric_name: query.metric.as_str().to_string(),
            dimensions: query.dimensions(),
            period_secs: PERIOD_SECS,
            stat: STAT.to_string(),
            start,
            end,
        }
    }
}
