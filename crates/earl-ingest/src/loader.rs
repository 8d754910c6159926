//! Series loading from CSV exports and JSON point dumps.
//!
//! CSV input has a header row with `time` and `value` columns. Rows may
//! arrive in any order; they are sorted before densification.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use earl_core::{EarlError, Point};

use crate::interpolate::densify;

/// Errors that can occur while loading a series from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: unrecognised timestamp {value:?}")]
    Timestamp { row: usize, value: String },

    #[error(transparent)]
    Series(#[from] EarlError),
}

#[derive(Debug, Deserialize)]
struct Record {
    time: String,
    value: f64,
}

/// Read a CSV series and densify it to one point per minute.
pub fn load_csv<R: Read>(reader: R) -> Result<Vec<Point>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (i, result) in rdr.deserialize::<Record>().enumerate() {
        let record = result?;
        // Row numbers are 1-based and skip the header.
        let time = parse_timestamp(&record.time).ok_or_else(|| LoadError::Timestamp {
            row: i + 2,
            value: record.time.clone(),
        })?;
        samples.push(Point::new(time, record.value));
    }

    if samples.is_empty() {
        return Err(EarlError::invalid("csv contains no rows").into());
    }

    samples.sort_by_key(|p| p.time);
    debug!(rows = samples.len(), "loaded csv samples");
    Ok(densify(&samples)?)
}

pub fn load_csv_file(path: &Path) -> Result<Vec<Point>, LoadError> {
    let file = File::open(path)?;
    load_csv(BufReader::new(file))
}

/// Read a JSON array of points (as written by `earl fetch`) and densify it.
pub fn load_json_file(path: &Path) -> Result<Vec<Point>, LoadError> {
    let file = File::open(path)?;
    let mut points: Vec<Point> = serde_json::from_reader(BufReader::new(file))?;
    points.sort_by_key(|p| p.time);
    Ok(densify(&points)?)
}

/// Parse an absolute timestamp.
///
/// Accepts RFC 3339 (`2022-11-11T00:00:00Z`), a zone-less
/// `2022-11-11 00:00:00` or `2022-11-11T00:00:00` read as UTC, or
/// integer epoch seconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
