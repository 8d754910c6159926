//! Cost estimation for the provisioned and on-demand billing modes.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use earl_core::{Point, Pricing};

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// Seconds covered by one per-minute consumption sample.
const SECS_PER_SAMPLE: f64 = 60.0;

const UNITS_PER_MILLION: f64 = 1_000_000.0;

/// Cost of a provisioned-capacity series.
///
/// Samples are bucketed into epoch-aligned hours; each bucket is billed
/// for a full hour at its highest capacity, partial hours included.
pub fn provisioned_cost(price_per_unit_hour: f64, provisioned: &[Point]) -> f64 {
    let mut hourly_peak: BTreeMap<i64, f64> = BTreeMap::new();
    for point in provisioned {
        let hour = point.time.timestamp_millis().div_euclid(MILLIS_PER_HOUR);
        let peak = hourly_peak.entry(hour).or_insert(point.value);
        *peak = peak.max(point.value);
    }

    hourly_peak.values().map(|cu| cu * price_per_unit_hour).sum()
}

/// Cost of consuming `usage` on demand.
///
/// Each value is a per-minute sample in units per second.
pub fn on_demand_cost(price_per_million: f64, usage: &[f64]) -> f64 {
    usage.iter().map(|v| v * SECS_PER_SAMPLE).sum::<f64>() / UNITS_PER_MILLION * price_per_million
}

pub fn on_demand_cost_for_points(price_per_million: f64, consumed: &[Point]) -> f64 {
    let usage: Vec<f64> = consumed.iter().map(|p| p.value).collect();
    on_demand_cost(price_per_million, &usage)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    Provisioned,
    OnDemand,
}

/// Side-by-side cost of the two billing modes for one series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostComparison {
    pub provisioned: f64,
    pub on_demand: f64,
    /// The cheaper mode; provisioned wins a tie.
    pub cheaper: BillingMode,
}

impl CostComparison {
    /// Absolute saving of the cheaper mode over the other.
    pub fn saving(&self) -> f64 {
        (self.provisioned - self.on_demand).abs()
    }
}

/// Price `provisioned` capacity against on-demand billing of `consumed`.
pub fn compare(pricing: &Pricing, consumed: &[Point], provisioned: &[Point]) -> CostComparison {
    let provisioned = provisioned_cost(pricing.provisioned_per_unit_hour, provisioned);
    let on_demand = on_demand_cost_for_points(pricing.on_demand_per_million, consumed);
    let cheaper = if provisioned <= on_demand {
        BillingMode::Provisioned
    } else {
        BillingMode::OnDemand
    };

    debug!(provisioned, on_demand, ?cheaper, "cost comparison");
    CostComparison {
        provisioned,
        on_demand,
        cheaper,
    }
}
