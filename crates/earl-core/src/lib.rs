//! earl-core — shared types for the capacity simulation pipeline.
//!
//! Every stage of the pipeline (ingestion, autoscaling simulation, cost
//! estimation, metrics fetching) exchanges [`Point`] series and fails
//! with an [`EarlError`]. The scaling policy and pricing inputs are
//! loaded from `earl.toml` through [`EarlConfig`].

pub mod config;
pub mod error;
pub mod types;

pub use config::EarlConfig;
pub use error::{EarlError, Result};
pub use types::*;
