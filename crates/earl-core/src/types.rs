//! Domain types for the capacity simulation pipeline.
//!
//! A series is a `Vec<Point>` ordered strictly ascending by time. The
//! consumption series is in capacity units per second; the provisioned
//! series is in capacity units.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EarlError, Result};

// ── Point ─────────────────────────────────────────────────────────

/// A single consumption or provisioned-capacity sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl Point {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

/// Check the series invariants every stage relies on.
///
/// The series must be non-empty, strictly ascending by time (which also
/// rules out duplicate timestamps), and carry finite, non-negative values.
pub fn validate_series(points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Err(EarlError::invalid("series is empty"));
    }

    for (i, point) in points.iter().enumerate() {
        if !point.value.is_finite() || point.value < 0.0 {
            return Err(EarlError::InvalidInput(format!(
                "value {} at {} must be finite and non-negative",
                point.value, point.time
            )));
        }
        if i > 0 {
            let prev = &points[i - 1];
            if point.time == prev.time {
                return Err(EarlError::InvalidInput(format!(
                    "duplicate timestamp {}",
                    point.time
                )));
            }
            if point.time < prev.time {
                return Err(EarlError::InvalidInput(format!(
                    "series not ascending: {} follows {}",
                    point.time, prev.time
                )));
            }
        }
    }

    Ok(())
}

// ── Bounds ────────────────────────────────────────────────────────

/// Time span of a series, used as chart axis bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: DateTime<Utc>,
    pub upper: DateTime<Utc>,
}

/// Earliest and latest timestamps in `points`, regardless of order.
pub fn bounds(points: &[Point]) -> Option<Bounds> {
    let lower = points.iter().map(|p| p.time).min()?;
    let upper = points.iter().map(|p| p.time).max()?;
    Some(Bounds { lower, upper })
}

// ── Scaling policy ────────────────────────────────────────────────

/// Target-tracking autoscaling parameters for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingPolicy {
    /// Capacity floor; also the capacity before the first sample.
    pub min: f64,
    /// Capacity ceiling.
    pub max: f64,
    /// Target utilization, strictly between 0 and 1.
    pub target: f64,
    /// Minimum spacing between two scale-outs.
    pub scale_out_cooldown: Duration,
    /// Minimum spacing between two scale-ins.
    pub scale_in_cooldown: Duration,
}

impl ScalingPolicy {
    /// Build a policy, rejecting inconsistent bounds.
    pub fn new(
        min: f64,
        max: f64,
        target: f64,
        scale_out_cooldown: Duration,
        scale_in_cooldown: Duration,
    ) -> Result<Self> {
        let policy = Self {
            min,
            max,
            target,
            scale_out_cooldown,
            scale_in_cooldown,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Check `min > 0`, `max >= min`, and `0 < target < 1`.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || self.min <= 0.0 {
            return Err(EarlError::InvalidInput(format!(
                "policy min must be positive, got {}",
                self.min
            )));
        }
        if !self.max.is_finite() || self.min > self.max {
            return Err(EarlError::InvalidInput(format!(
                "policy min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if !(self.target > 0.0 && self.target < 1.0) {
            return Err(EarlError::InvalidInput(format!(
                "policy target must be within (0, 1), got {}",
                self.target
            )));
        }
        Ok(())
    }
}

// ── Pricing ───────────────────────────────────────────────────────

/// Unit prices for the two billing modes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Price of one provisioned capacity unit for one hour.
    pub provisioned_per_unit_hour: f64,
    /// Price of one million consumed capacity units on demand.
    pub on_demand_per_million: f64,
}
