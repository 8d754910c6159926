use std::path::Path;

use earl_core::bounds;

pub fn ingest(csv: &Path, format: &str) -> anyhow::Result<()> {
    let points = super::load_series(Some(csv), None)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        _ => {
            if let Some(b) = bounds(&points) {
                println!("# {} points, {} → {}", points.len(), b.lower, b.upper);
            }
            for p in &points {
                println!("{}\t{:.3}", p.time.to_rfc3339(), p.value);
            }
        }
    }

    Ok(())
}
