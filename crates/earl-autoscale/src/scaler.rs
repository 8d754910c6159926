//! Autoscaler: replays consumption through the scaling policy.
//!
//! A fresh `ScaleState` is created for every run, so one `Autoscaler`
//! can be shared freely across threads and reused for many series.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::debug;

use earl_core::{EarlError, Point, Result, ScalingPolicy, validate_series};

/// Samples that must all exceed the target before scaling out.
const SCALE_OUT_WINDOW: usize = 2;

/// Samples that must all sit below the scale-in threshold.
const SCALE_IN_WINDOW: usize = 15;

/// Scale-in triggers below `target - SCALE_IN_MARGIN` utilization.
const SCALE_IN_MARGIN: f64 = 0.2;

/// Scale-ins allowed per UTC day before throttling kicks in.
const DAILY_SCALE_IN_QUOTA: usize = 4;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Spacing between scale-ins once the daily quota is used up.
fn throttled_scale_in_interval() -> TimeDelta {
    TimeDelta::hours(1)
}

/// The scaling decision taken at a single sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScaleDecision {
    /// Raise provisioned capacity to the given value.
    ScaleOut(f64),
    /// Lower provisioned capacity to the given value.
    ScaleIn(f64),
    /// No change needed.
    NoChange,
}

impl ScaleDecision {
    /// Combine the independently evaluated scale-out and scale-in
    /// candidates. Both being present means the policy contradicts itself.
    fn resolve(
        scale_out: Option<f64>,
        scale_in: Option<f64>,
        time: DateTime<Utc>,
    ) -> Result<Self> {
        match (scale_out, scale_in) {
            (Some(up), Some(down)) => Err(EarlError::InternalInvariant(format!(
                "scale-out to {up} and scale-in to {down} both triggered at {time}"
            ))),
            (Some(up), None) => Ok(Self::ScaleOut(up)),
            (None, Some(down)) => Ok(Self::ScaleIn(down)),
            (None, None) => Ok(Self::NoChange),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleDirection {
    ScaleOut,
    ScaleIn,
}

/// A capacity change the simulated scaler performed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingEvent {
    pub time: DateTime<Utc>,
    pub direction: ScaleDirection,
    pub from: f64,
    pub to: f64,
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    /// Provisioned capacity, one point per consumption point, same timestamps.
    pub provisioned: Vec<Point>,
    /// Every scaling action, in time order.
    pub events: Vec<ScalingEvent>,
}

/// Per-run scaling state.
struct ScaleState {
    /// Capacity in effect before the current sample.
    previous: f64,
    /// Last time we scaled out.
    last_scale_out: Option<DateTime<Utc>>,
    /// Scale-ins performed so far, pruned to the current UTC day on
    /// each permission check.
    scale_ins: Vec<DateTime<Utc>>,
}

impl ScaleState {
    fn new(initial: f64) -> Self {
        Self {
            previous: initial,
            last_scale_out: None,
            scale_ins: Vec::new(),
        }
    }

    fn scale_out_ready(&self, now: DateTime<Utc>, cooldown: TimeDelta) -> bool {
        self.last_scale_out
            .is_none_or(|last| now - last >= cooldown)
    }

    /// Whether a scale-in may happen at `now`.
    ///
    /// Drops logged scale-ins from earlier UTC days as a side effect.
    fn can_scale_in(&mut self, now: DateTime<Utc>, cooldown: TimeDelta) -> bool {
        if let Some(&last) = self.scale_ins.last() {
            match now.checked_sub_signed(cooldown) {
                Some(earliest) if last <= earliest => {}
                _ => return false,
            }
        }

        let today = utc_day(now);
        self.scale_ins.retain(|t| utc_day(*t) >= today);

        self.scale_ins.len() < DAILY_SCALE_IN_QUOTA
            || self.scale_ins.last().is_some_and(|last| {
                last.checked_add_signed(throttled_scale_in_interval())
                    .is_some_and(|next| next < now)
            })
    }
}

fn utc_day(t: DateTime<Utc>) -> i64 {
    t.timestamp().div_euclid(SECS_PER_DAY)
}

/// Replays consumption series through a [`ScalingPolicy`].
#[derive(Debug, Clone)]
pub struct Autoscaler {
    policy: ScalingPolicy,
    scale_out_cooldown: TimeDelta,
    scale_in_cooldown: TimeDelta,
}

impl Autoscaler {
    /// Create an autoscaler, rejecting an invalid policy.
    pub fn new(policy: ScalingPolicy) -> Result<Self> {
        policy.validate()?;
        let scale_out_cooldown = to_delta(policy.scale_out_cooldown, "scale-out")?;
        let scale_in_cooldown = to_delta(policy.scale_in_cooldown, "scale-in")?;
        Ok(Self {
            policy,
            scale_out_cooldown,
            scale_in_cooldown,
        })
    }

    pub fn policy(&self) -> &ScalingPolicy {
        &self.policy
    }

    /// Simulate the provisioned capacity for a dense consumption series.
    ///
    /// The series must be strictly ascending. The result has exactly one
    /// point per input point, at the same timestamps.
    pub fn run(&self, consumption: &[Point]) -> Result<Simulation> {
        validate_series(consumption)?;

        let mut state = ScaleState::new(self.policy.min);
        let mut provisioned = Vec::with_capacity(consumption.len());
        let mut events = Vec::new();

        for (i, sample) in consumption.iter().enumerate() {
            let now = sample.time;

            let scale_out = if i >= SCALE_OUT_WINDOW
                && state.scale_out_ready(now, self.scale_out_cooldown)
            {
                self.scale_out_target(&consumption[i + 1 - SCALE_OUT_WINDOW..=i], state.previous)
            } else {
                None
            };

            let scale_in = if i >= SCALE_IN_WINDOW
                && state.can_scale_in(now, self.scale_in_cooldown)
            {
                self.scale_in_target(&consumption[i + 1 - SCALE_IN_WINDOW..=i], state.previous)
            } else {
                None
            };

            let from = state.previous;
            let value = match ScaleDecision::resolve(scale_out, scale_in, now)? {
                ScaleDecision::ScaleOut(to) => {
                    state.last_scale_out = Some(now);
                    debug!(time = %now, from, to, direction = "out", "scaling out");
                    events.push(ScalingEvent {
                        time: now,
                        direction: ScaleDirection::ScaleOut,
                        from,
                        to,
                    });
                    to
                }
                ScaleDecision::ScaleIn(to) => {
                    state.scale_ins.push(now);
                    debug!(time = %now, from, to, direction = "in", "scaling in");
                    events.push(ScalingEvent {
                        time: now,
                        direction: ScaleDirection::ScaleIn,
                        from,
                        to,
                    });
                    to
                }
                ScaleDecision::NoChange => from,
            };

            state.previous = value;
            provisioned.push(Point::new(now, value));
        }

        debug!(
            points = provisioned.len(),
            events = events.len(),
            "simulation complete"
        );
        Ok(Simulation {
            provisioned,
            events,
        })
    }

    /// Scale-out candidate when every sample in `window` is above target.
    ///
    /// Sized from the oldest sample in the window.
    fn scale_out_target(&self, window: &[Point], previous: f64) -> Option<f64> {
        let threshold = previous * self.policy.target;
        if !window.iter().all(|p| p.value > threshold) {
            return None;
        }
        let desired = (window[0].value / self.policy.target).ceil();
        let candidate = desired.min(self.policy.max);
        (candidate != previous).then_some(candidate)
    }

    /// Scale-in candidate when every sample in `window` is below the
    /// scale-in threshold. Sized from the oldest sample in the window.
    fn scale_in_target(&self, window: &[Point], previous: f64) -> Option<f64> {
        let threshold = previous * (self.policy.target - SCALE_IN_MARGIN);
        if !window.iter().all(|p| p.value < threshold) {
            return None;
        }
        let desired = (window[0].value / self.policy.target).ceil();
        let candidate = desired.max(self.policy.min);
        (candidate != previous).then_some(candidate)
    }
}

fn to_delta(cooldown: std::time::Duration, name: &str) -> Result<TimeDelta> {
    TimeDelta::from_std(cooldown)
        .map_err(|_| EarlError::InvalidInput(format!("{name} cooldown out of range")))
}

/// Simulate the provisioned series for `consumption` under `policy`.
pub fn simulate(policy: &ScalingPolicy, consumption: &[Point]) -> Result<Vec<Point>> {
    Ok(Autoscaler::new(policy.clone())?.run(consumption)?.provisioned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    /// 2021-08-20 00:00:00 UTC.
    const MIDNIGHT: i64 = 1_629_417_600;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(MIDNIGHT + minute * 60, 0).unwrap()
    }

    /// Build a per-minute series from `(minute, value)` steps. Each value
    /// holds until the next step; the last step ends the series.
    fn series(steps: &[(i64, f64)]) -> Vec<Point> {
        let first = steps[0].0;
        let last = steps[steps.len() - 1].0;
        let mut value = steps[0].1;
        (first..=last)
            .map(|minute| {
                if let Some(&(_, v)) = steps.iter().find(|(m, _)| *m == minute) {
                    value = v;
                }
                Point::new(at(minute), value)
            })
            .collect()
    }

    fn minutes(n: u64) -> Duration {
        Duration::from_secs(n * 60)
    }

    fn policy() -> ScalingPolicy {
        ScalingPolicy {
            min: 100.0,
            max: 1000.0,
            target: 0.7,
            scale_out_cooldown: minutes(5),
            scale_in_cooldown: minutes(30),
        }
    }

    fn run(policy: ScalingPolicy, consumption: &[Point]) -> Vec<Point> {
        simulate(&policy, consumption).unwrap()
    }

    #[test]
    fn constant_usage_stays_at_min() {
        let consumption = series(&[(0, 10.0), (60, 10.0)]);
        let result = run(policy(), &consumption);
        assert_eq!(result, series(&[(0, 100.0), (60, 100.0)]));
    }

    #[test]
    fn single_point_yields_min() {
        let consumption = series(&[(0, 900.0)]);
        assert_eq!(run(policy(), &consumption), series(&[(0, 100.0)]));
    }

    // ── Scale out ─────────────────────────────────────────────────

    #[test]
    fn scales_out_when_usage_crosses_threshold() {
        let consumption = series(&[(0, 0.0), (10, 100.0), (20, 100.0)]);
        let result = run(policy(), &consumption);
        // 143 = ceil(100 / 0.7)
        assert_eq!(result, series(&[(0, 100.0), (11, 143.0), (20, 143.0)]));
    }

    #[test]
    fn does_not_scale_out_on_the_boundary() {
        let consumption = series(&[(0, 0.0), (10, 70.0), (20, 70.0)]);
        let result = run(policy(), &consumption);
        assert_eq!(result, series(&[(0, 100.0), (20, 100.0)]));
    }

    #[test]
    fn scales_out_repeatedly() {
        let consumption = series(&[
            (0, 0.0),
            (10, 100.0),
            (20, 200.0),
            (30, 300.0),
            (40, 400.0),
            (50, 400.0),
        ]);
        let result = run(policy(), &consumption);
        assert_eq!(
            result,
            series(&[
                (0, 100.0),
                (11, 143.0),
                (21, 286.0),
                (31, 429.0),
                (41, 572.0),
                (50, 572.0),
            ])
        );
    }

    #[test]
    fn scales_out_every_two_minutes() {
        let mut p = policy();
        p.scale_out_cooldown = minutes(2);
        let consumption = series(&[
            (0, 0.0),
            (10, 100.0),
            (12, 200.0),
            (14, 300.0),
            (16, 400.0),
            (20, 400.0),
        ]);
        let result = run(p, &consumption);
        assert_eq!(
            result,
            series(&[
                (0, 100.0),
                (11, 143.0),
                (13, 286.0),
                (15, 429.0),
                (17, 572.0),
                (20, 572.0),
            ])
        );
    }

    #[test]
    fn respects_scale_out_cooldown() {
        let mut p = policy();
        p.scale_out_cooldown = minutes(10);
        let consumption = series(&[(0, 0.0), (10, 100.0), (15, 200.0), (30, 200.0)]);
        let result = run(p, &consumption);
        // Eligible from minute 16 but the cooldown holds it until 21.
        assert_eq!(
            result,
            series(&[(0, 100.0), (11, 143.0), (21, 286.0), (30, 286.0)])
        );
    }

    #[test]
    fn zero_cooldown_still_needs_two_samples_above_target() {
        let mut p = policy();
        p.scale_out_cooldown = Duration::ZERO;
        let consumption = series(&[(0, 0.0), (10, 100.0), (12, 200.0), (30, 200.0)]);
        let result = run(p, &consumption);
        assert_eq!(
            result,
            series(&[(0, 100.0), (11, 143.0), (13, 286.0), (30, 286.0)])
        );
    }

    #[test]
    fn scale_out_sizes_from_the_older_sample() {
        let consumption = series(&[(0, 0.0), (10, 200.0), (11, 100.0), (12, 200.0), (20, 200.0)]);
        let result = run(policy(), &consumption);
        assert_eq!(result, series(&[(0, 100.0), (11, 286.0), (20, 286.0)]));
    }

    #[test]
    fn respects_max_capacity() {
        let consumption = series(&[(0, 0.0), (5, 5000.0), (10, 5000.0)]);
        let result = run(policy(), &consumption);
        assert_eq!(result, series(&[(0, 100.0), (6, 1000.0), (10, 1000.0)]));
    }

    // ── Scale in ──────────────────────────────────────────────────

    #[test]
    fn scales_in_when_usage_drops() {
        let consumption = series(&[(0, 500.0), (10, 300.0), (60, 300.0)]);
        let result = run(policy(), &consumption);
        assert_eq!(
            result,
            series(&[(0, 100.0), (2, 715.0), (24, 429.0), (60, 429.0)])
        );
    }

    #[test]
    fn respects_scale_in_cooldown() {
        let consumption = series(&[(0, 500.0), (10, 300.0), (15, 200.0), (60, 300.0)]);
        let result = run(policy(), &consumption);
        assert_eq!(
            result,
            series(&[(0, 100.0), (2, 715.0), (24, 429.0), (54, 286.0), (60, 286.0)])
        );
    }

    #[test]
    fn scales_in_after_fifteen_minute_cooldown() {
        let mut p = policy();
        p.scale_in_cooldown = minutes(15);
        let consumption = series(&[(0, 500.0), (10, 300.0), (15, 200.0), (60, 300.0)]);
        let result = run(p, &consumption);
        assert_eq!(
            result,
            series(&[(0, 100.0), (2, 715.0), (24, 429.0), (39, 286.0), (60, 286.0)])
        );
    }

    #[test]
    fn zero_cooldown_still_needs_fifteen_low_samples() {
        let mut p = policy();
        p.scale_in_cooldown = Duration::ZERO;
        let consumption = series(&[(0, 500.0), (10, 300.0), (15, 200.0), (60, 300.0)]);
        let result = run(p, &consumption);
        assert_eq!(
            result,
            series(&[(0, 100.0), (2, 715.0), (24, 429.0), (29, 286.0), (60, 286.0)])
        );
    }

    #[test]
    fn scale_in_sizes_from_the_oldest_sample() {
        let mut p = policy();
        p.scale_in_cooldown = Duration::ZERO;
        // The window at minute 24 opens on a 200 sample even though it
        // contains a 300 at minute 14.
        let consumption = series(&[(0, 500.0), (10, 200.0), (14, 300.0), (15, 200.0), (60, 300.0)]);
        let result = run(p, &consumption);
        assert_eq!(
            result,
            series(&[(0, 100.0), (2, 715.0), (24, 286.0), (60, 286.0)])
        );
    }

    #[test]
    fn four_scale_ins_then_throttled() {
        let mut p = policy();
        p.scale_in_cooldown = Duration::ZERO;
        let consumption = series(&[
            (0, 1000.0),
            (10, 499.0),
            (15, 350.0),
            (20, 249.0),
            (25, 177.0),
            (30, 125.0),
            (60, 100.0),
        ]);
        let result = run(p, &consumption);
        // 501 rather than 500: 350 / 0.7 lands just above 500.
        assert_eq!(
            result,
            series(&[
                (0, 100.0),
                (2, 1000.0),
                (24, 713.0),
                (29, 501.0),
                (34, 356.0),
                (39, 253.0),
                (60, 253.0),
            ])
        );
    }

    #[test]
    fn six_step_downs_respect_cooldown_then_hourly_throttle() {
        let consumption = series(&[
            (0, 1000.0),
            (10, 499.0),
            (40, 350.0),
            (70, 249.0),
            (100, 177.0),
            (130, 125.0),
            (200, 89.0),
            (300, 89.0),
        ]);
        let sim = Autoscaler::new(policy()).unwrap().run(&consumption).unwrap();

        // Four scale-ins 30 minutes apart, then one per hour after the fourth.
        assert_eq!(
            sim.provisioned,
            series(&[
                (0, 100.0),
                (2, 1000.0),
                (24, 713.0),
                (54, 501.0),
                (84, 356.0),
                (114, 253.0),
                (175, 179.0),
                (236, 128.0),
                (300, 128.0),
            ])
        );

        let scale_ins: Vec<_> = sim
            .events
            .iter()
            .filter(|e| e.direction == ScaleDirection::ScaleIn)
            .map(|e| e.time)
            .collect();
        assert_eq!(
            scale_ins,
            vec![at(24), at(54), at(84), at(114), at(175), at(236)]
        );
        assert!(scale_ins[4] - scale_ins[3] > TimeDelta::hours(1));
        assert!(scale_ins[5] - scale_ins[4] > TimeDelta::hours(1));
    }

    #[test]
    fn autoscaler_reports_the_policy_it_runs() {
        let scaler = Autoscaler::new(policy()).unwrap();
        assert_eq!(scaler.policy(), &policy());
    }

    #[test]
    fn throttled_scale_ins_happen_hourly() {
        let mut p = policy();
        p.scale_in_cooldown = Duration::ZERO;
        let consumption = series(&[
            (0, 1000.0),
            (10, 499.0),
            (15, 350.0),
            (20, 249.0),
            (25, 177.0),
            (30, 125.0),
            (100, 0.0),
            (180, 0.0),
        ]);
        let result = run(p, &consumption);
        assert_eq!(
            result,
            series(&[
                (0, 100.0),
                (2, 1000.0),
                (24, 713.0),
                (29, 501.0),
                (34, 356.0),
                (39, 253.0),
                (100, 179.0),
                (161, 100.0),
                (180, 100.0),
            ])
        );
    }

    #[test]
    fn scale_in_quota_resets_at_midnight() {
        let mut p = policy();
        p.scale_in_cooldown = Duration::ZERO;
        let almost_midnight = 23 * 60 + 20;
        let consumption = series(&[
            (0, 1000.0),
            (almost_midnight + 10, 499.0),
            (almost_midnight + 15, 350.0),
            (almost_midnight + 20, 249.0),
            (almost_midnight + 25, 177.0),
            (almost_midnight + 30, 125.0),
            (almost_midnight + 35, 89.0),
            (almost_midnight + 40, 63.0),
            (almost_midnight + 180, 0.0),
        ]);
        let result = run(p, &consumption);
        assert_eq!(
            result,
            series(&[
                (0, 100.0),
                (2, 1000.0),
                (almost_midnight + 24, 713.0),
                (almost_midnight + 29, 501.0),
                (almost_midnight + 34, 356.0),
                (almost_midnight + 39, 253.0),
                (almost_midnight + 44, 179.0),
                (almost_midnight + 49, 128.0),
                (almost_midnight + 54, 100.0),
                (almost_midnight + 180, 100.0),
            ])
        );
    }

    #[test]
    fn scale_in_log_keeps_only_today() {
        let mut state = ScaleState::new(100.0);
        state.scale_ins = vec![at(-120), at(-60), at(-30), at(-10), at(1)];

        assert!(state.can_scale_in(at(5), TimeDelta::zero()));
        assert_eq!(state.scale_ins, vec![at(1)]);
    }

    #[test]
    fn scale_in_blocked_by_cooldown_before_quota() {
        let mut state = ScaleState::new(100.0);
        state.scale_ins = vec![at(0)];

        assert!(!state.can_scale_in(at(10), TimeDelta::minutes(30)));
        assert!(state.can_scale_in(at(30), TimeDelta::minutes(30)));
    }

    // ── Run-level properties ──────────────────────────────────────

    #[test]
    fn events_record_each_action() {
        let consumption = series(&[(0, 500.0), (10, 300.0), (60, 300.0)]);
        let sim = Autoscaler::new(policy()).unwrap().run(&consumption).unwrap();

        assert_eq!(sim.events.len(), 2);
        assert_eq!(sim.events[0].direction, ScaleDirection::ScaleOut);
        assert_eq!(sim.events[0].time, at(2));
        assert_eq!((sim.events[0].from, sim.events[0].to), (100.0, 715.0));
        assert_eq!(sim.events[1].direction, ScaleDirection::ScaleIn);
        assert_eq!(sim.events[1].time, at(24));
        assert_eq!((sim.events[1].from, sim.events[1].to), (715.0, 429.0));
    }

    #[test]
    fn runs_are_repeatable() {
        let consumption = series(&[(0, 0.0), (10, 800.0), (40, 20.0), (200, 20.0)]);
        let scaler = Autoscaler::new(policy()).unwrap();
        assert_eq!(scaler.run(&consumption).unwrap(), scaler.run(&consumption).unwrap());
    }

    #[test]
    fn output_matches_input_timestamps_and_stays_in_bounds() {
        let consumption = series(&[
            (0, 0.0),
            (10, 2000.0),
            (30, 5.0),
            (120, 400.0),
            (150, 0.0),
            (400, 0.0),
        ]);
        let p = policy();
        let result = run(p.clone(), &consumption);

        assert_eq!(result.len(), consumption.len());
        for (out, inp) in result.iter().zip(&consumption) {
            assert_eq!(out.time, inp.time);
            assert!(out.value >= p.min && out.value <= p.max);
        }
    }

    #[test]
    fn empty_series_is_rejected() {
        assert!(matches!(
            simulate(&policy(), &[]),
            Err(EarlError::InvalidInput(_))
        ));
    }

    #[test]
    fn unsorted_series_is_rejected() {
        let consumption = vec![Point::new(at(1), 1.0), Point::new(at(0), 1.0)];
        assert!(matches!(
            simulate(&policy(), &consumption),
            Err(EarlError::InvalidInput(_))
        ));
    }

    #[test]
    fn min_above_max_is_rejected() {
        let mut p = policy();
        p.min = 2000.0;
        assert!(matches!(
            Autoscaler::new(p),
            Err(EarlError::InvalidInput(_))
        ));
    }

    #[test]
    fn conflicting_candidates_are_an_invariant_violation() {
        assert!(matches!(
            ScaleDecision::resolve(Some(200.0), Some(50.0), at(0)),
            Err(EarlError::InternalInvariant(_))
        ));
        assert_eq!(
            ScaleDecision::resolve(None, None, at(0)).unwrap(),
            ScaleDecision::NoChange
        );
        assert_eq!(
            ScaleDecision::resolve(None, Some(50.0), at(0)).unwrap(),
            ScaleDecision::ScaleIn(50.0)
        );
    }
}
