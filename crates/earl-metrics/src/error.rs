//! Metrics retrieval error types.

use thiserror::Error;

use earl_core::EarlError;

/// Errors that can occur while fetching consumed capacity.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error(
        "no metrics client configured for region {region}; configured regions: {}",
        .configured.join(", ")
    )]
    RegionNotConfigured { region: String, configured: Vec<String> },

    #[error("metrics client error: {0}")]
    Client(#[from] anyhow::Error),

    #[error(transparent)]
    Series(#[from] EarlError),
}

pub type MetricsResult<T> = Result<T, MetricsError>;
