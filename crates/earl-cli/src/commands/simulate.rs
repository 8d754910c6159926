use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::info;

use earl_autoscale::{Autoscaler, ScaleDirection, ScalingEvent};
use earl_core::config::PolicyConfig;
use earl_core::{Bounds, EarlConfig, Point, Pricing, ScalingPolicy, bounds};
use earl_pricing::{BillingMode, CostComparison};

#[derive(Debug, Args)]
pub struct SimulateArgs {
    /// CSV export with `time` and `value` columns
    #[arg(long, conflicts_with = "series")]
    pub csv: Option<PathBuf>,
    /// JSON point series, as written by `earl fetch`
    #[arg(long)]
    pub series: Option<PathBuf>,
    /// earl.toml holding the policy and pricing
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Minimum provisioned capacity
    #[arg(long)]
    pub min: Option<f64>,
    /// Maximum provisioned capacity
    #[arg(long)]
    pub max: Option<f64>,
    /// Target utilization (0-1)
    #[arg(long)]
    pub target: Option<f64>,
    /// Scale-out cooldown, e.g. "5m"
    #[arg(long)]
    pub scale_out_cooldown: Option<String>,
    /// Scale-in cooldown, e.g. "30m"
    #[arg(long)]
    pub scale_in_cooldown: Option<String>,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    bounds: Option<Bounds>,
    policy: &'a ScalingPolicy,
    events: &'a [ScalingEvent],
    cost: Option<CostComparison>,
    consumed: &'a [Point],
    provisioned: &'a [Point],
}

pub fn simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let config = args
        .config
        .as_deref()
        .map(EarlConfig::from_file)
        .transpose()
        .context("loading config")?;

    let policy = resolve_policy(&args, config.as_ref())?;
    let pricing = config
        .as_ref()
        .and_then(|c| c.pricing.as_ref())
        .map(Pricing::from);

    let consumed = super::load_series(args.csv.as_deref(), args.series.as_deref())?;
    info!(points = consumed.len(), "simulating autoscaling");

    let scaler = Autoscaler::new(policy)?;
    let simulation = scaler.run(&consumed)?;
    let cost = pricing.map(|p| earl_pricing::compare(&p, &consumed, &simulation.provisioned));

    let report = Report {
        bounds: bounds(&consumed),
        policy: scaler.policy(),
        events: &simulation.events,
        cost,
        consumed: &consumed,
        provisioned: &simulation.provisioned,
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_text(&report),
    }

    Ok(())
}

/// Start from the config file's policy, if any, and apply flag overrides.
fn resolve_policy(args: &SimulateArgs, config: Option<&EarlConfig>) -> anyhow::Result<ScalingPolicy> {
    let mut policy = match config {
        Some(c) => c.policy.clone(),
        None => PolicyConfig {
            min: args
                .min
                .context("--min is required without --config")?,
            max: args
                .max
                .context("--max is required without --config")?,
            target: 0.7,
            scale_out_cooldown: "300s".to_string(),
            scale_in_cooldown: "1800s".to_string(),
        },
    };

    if let Some(min) = args.min {
        policy.min = min;
    }
    if let Some(max) = args.max {
        policy.max = max;
    }
    if let Some(target) = args.target {
        policy.target = target;
    }
    if let Some(cooldown) = &args.scale_out_cooldown {
        policy.scale_out_cooldown = cooldown.clone();
    }
    if let Some(cooldown) = &args.scale_in_cooldown {
        policy.scale_in_cooldown = cooldown.clone();
    }

    Ok(policy.to_policy()?)
}

fn print_text(report: &Report<'_>) {
    if let Some(b) = &report.bounds {
        println!("Series:  {} → {} ({} points)", b.lower, b.upper, report.consumed.len());
    }
    let p = report.policy;
    println!(
        "Policy:  min {} · max {} · target {:.2} · out {}s · in {}s",
        p.min,
        p.max,
        p.target,
        p.scale_out_cooldown.as_secs(),
        p.scale_in_cooldown.as_secs()
    );

    println!();
    println!("Scaling events ({}):", report.events.len());
    for e in report.events {
        let arrow = match e.direction {
            ScaleDirection::ScaleOut => "▲",
            ScaleDirection::ScaleIn => "▼",
        };
        println!("  {} {arrow} {} → {}", e.time.to_rfc3339(), e.from, e.to);
    }

    let peak = report
        .provisioned
        .iter()
        .map(|p| p.value)
        .fold(0.0_f64, f64::max);
    println!();
    println!("Peak provisioned: {peak}");

    if let Some(cost) = &report.cost {
        let cheaper = match cost.cheaper {
            BillingMode::Provisioned => "provisioned",
            BillingMode::OnDemand => "on-demand",
        };
        println!("Provisioned cost: {:.2}", cost.provisioned);
        println!("On-demand cost:   {:.2}", cost.on_demand);
        println!("Cheaper:          {cheaper} (saves {:.2})", cost.saving());
    }
}
