//! Linear gap filling at one-minute resolution.

use chrono::TimeDelta;
use tracing::debug;

use earl_core::{Point, Result, validate_series};

/// Fill every gap wider than a minute with linearly interpolated points.
///
/// Each sample is emitted unchanged. Between samples `a` and `b` whose
/// gap spans more than one whole minute, a point is added at
/// `a.time + k * 1m` for every such instant strictly before `b.time`.
/// The final sample is emitted as-is; nothing is extrapolated past it.
pub fn densify(samples: &[Point]) -> Result<Vec<Point>> {
    validate_series(samples)?;

    let step = TimeDelta::minutes(1);
    let mut dense = Vec::with_capacity(samples.len());

    for pair in samples.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let gap = b.time - a.time;

        dense.push(a);
        if gap.num_minutes() <= 1 {
            continue;
        }

        let span_ms = gap.num_milliseconds() as f64;
        let delta = b.value - a.value;
        let mut t = a.time + step;
        while t < b.time {
            let elapsed_ms = (t - a.time).num_milliseconds() as f64;
            dense.push(Point::new(t, a.value + delta * elapsed_ms / span_ms));
            t += step;
        }
    }

    if let Some(last) = samples.last() {
        dense.push(*last);
    }

    debug!(
        samples = samples.len(),
        points = dense.len(),
        "densified series"
    );
    Ok(dense)
}
