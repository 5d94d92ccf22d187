//! Report snapshot schema.
//!
//! Defines the serializable shape of a finished report.
//! Schema is versioned to allow future evolution.

use crate::aggregator::stopwatch::Stopwatch;
use crate::clock::TimeUnit;
use crate::utils::config::SCHEMA_VERSION;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// Unit all durations in this report are expressed in
    pub resolution: TimeUnit,

    /// Timestamp when the report was generated (ISO 8601, UTC)
    pub generated_at: String,

    /// One entry per completed path, sorted by path
    pub events: Vec<ReportEntry>,

    /// Events still open when the snapshot was taken
    pub still_running: u64,
}

/// Accumulated timings for one path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Fully-qualified dotted path (e.g. "load.parse")
    pub path: String,

    /// Total accumulated duration in the report's resolution
    pub time: u64,

    /// Completed occurrences merged into this path
    pub count: u32,

    /// Mean duration per occurrence (truncating)
    pub mean: u64,
}

impl Report {
    /// Snapshot a stopwatch's registry.
    ///
    /// The stopwatch is not consumed or modified; open events stay open
    /// and are only counted.
    pub fn from_stopwatch(stopwatch: &Stopwatch) -> Self {
        let resolution = stopwatch.resolution();

        let events = stopwatch
            .records()
            .iter()
            .map(|record| {
                let time = record.time_in(resolution);
                ReportEntry {
                    path: record.path(),
                    time,
                    count: record.count(),
                    mean: time / u64::from(record.count().max(1)),
                }
            })
            .collect();

        Self {
            version: SCHEMA_VERSION.to_string(),
            resolution,
            generated_at: Utc::now().to_rfc3339(),
            events,
            still_running: stopwatch.running() as u64,
        }
    }
}
