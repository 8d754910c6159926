//! earl-ingest — turn irregular samples into a dense per-minute series.
//!
//! Consumption data arrives sparse (a CSV export with hourly rows, a
//! metrics window with gaps). The simulator and cost model assume one
//! sample per minute, so every gap wider than a minute is filled by
//! linear interpolation between its two neighbours.
//!
//! ```text
//! t:      00:00        00:03
//! in:     [0] ───────── [30]
//! out:    [0] [10] [20] [30]
//! ```

pub mod interpolate;
pub mod loader;

pub use interpolate::densify;
pub use loader::{LoadError, load_csv, load_csv_file, load_json_file, parse_timestamp};
