pub mod fetch;
pub mod ingest;
pub mod init;
pub mod simulate;

use std::path::Path;

use anyhow::Context;
use earl_core::Point;

/// Load a consumption series from either a CSV export or a JSON dump.
pub fn load_series(csv: Option<&Path>, series: Option<&Path>) -> anyhow::Result<Vec<Point>> {
    match (csv, series) {
        (Some(path), None) => earl_ingest::load_csv_file(path)
            .with_context(|| format!("loading {}", path.display())),
        (None, Some(path)) => earl_ingest::load_json_file(path)
            .with_context(|| format!("loading {}", path.display())),
        _ => anyhow::bail!("pass exactly one of --csv or --series"),
    }
}
