//! earl-autoscale — replay a consumption series through a simulated
//! target-tracking scaler.
//!
//! The simulator scans a dense per-minute consumption series once, left
//! to right, and emits the capacity the scaler would have provisioned at
//! every sample. Each run owns its state; identical inputs always produce
//! identical output.
//!
//! # Scaling Algorithm
//!
//! ```text
//! previous = policy.min
//!
//! for each sample i at time t:
//!     if i >= 2 and t - last_scale_out >= scale_out_cooldown
//!        and last 2 samples > previous * target:
//!         scale_out = min(ceil(sample[i-1] / target), max)
//!
//!     if i >= 15 and scale-in permitted at t
//!        and last 15 samples < previous * (target - 0.2):
//!         scale_in = max(ceil(sample[i-14] / target), min)
//!
//!     previous = scale_out ?? scale_in ?? previous
//! ```
//!
//! A candidate equal to `previous` is not an action. Scale-in is
//! permitted once `scale_in_cooldown` has passed since the last scale-in
//! and either fewer than four scale-ins happened on the current UTC day
//! or the last one was more than an hour ago.

pub mod scaler;

pub use scaler::{Autoscaler, ScaleDecision, ScaleDirection, ScalingEvent, Simulation, simulate};
