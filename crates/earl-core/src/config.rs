//! earl.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EarlError, Result};
use crate::types::{Pricing, ScalingPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarlConfig {
    pub policy: PolicyConfig,
    pub pricing: Option<PricingConfig>,
    pub metrics: Option<MetricsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_target")]
    pub target: f64,
    #[serde(default = "default_scale_out_cooldown")]
    pub scale_out_cooldown: String,
    #[serde(default = "default_scale_in_cooldown")]
    pub scale_in_cooldown: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub provisioned_per_unit_hour: f64,
    pub on_demand_per_million: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub regions: Vec<String>,
    pub default_region: Option<String>,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_target() -> f64 {
    0.7
}

fn default_scale_out_cooldown() -> String {
    "300s".to_string()
}

fn default_scale_in_cooldown() -> String {
    "1800s".to_string()
}

fn default_window_days() -> u32 {
    7
}

impl EarlConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EarlConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a starter earl.toml with the given capacity bounds.
    pub fn scaffold(min: f64, max: f64) -> Self {
        EarlConfig {
            policy: PolicyConfig {
                min,
                max,
                target: default_target(),
                scale_out_cooldown: default_scale_out_cooldown(),
                scale_in_cooldown: default_scale_in_cooldown(),
            },
            pricing: Some(PricingConfig {
                provisioned_per_unit_hour: 0.00065,
                on_demand_per_million: 1.25,
            }),
            metrics: Some(MetricsConfig {
                regions: vec!["us-east-1".to_string()],
                default_region: Some("us-east-1".to_string()),
                window_days: default_window_days(),
            }),
        }
    }
}

impl PolicyConfig {
    /// Convert into a validated [`ScalingPolicy`].
    pub fn to_policy(&self) -> Result<ScalingPolicy> {
        ScalingPolicy::new(
            self.min,
            self.max,
            self.target,
            parse_duration(&self.scale_out_cooldown)?,
            parse_duration(&self.scale_in_cooldown)?,
        )
    }
}

impl From<&PricingConfig> for Pricing {
    fn from(config: &PricingConfig) -> Self {
        Pricing {
            provisioned_per_unit_hour: config.provisioned_per_unit_hour,
            on_demand_per_million: config.on_demand_per_million,
        }
    }
}

/// Parse a duration string like "30s", "5m", "1h", or bare seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    let (digits, scale) = if let Some(secs) = s.strip_suffix('s') {
        (secs, 1)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60)
    } else if let Some(hours) = s.strip_suffix('h') {
        (hours, 3600)
    } else {
        (s, 1)
    };

    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .map(Duration::from_secs)
        .ok_or_else(|| EarlError::InvalidInput(format!("invalid duration: {s:?}")))
}
