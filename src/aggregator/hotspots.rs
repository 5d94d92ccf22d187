//! Rank completed paths by accumulated duration.
//!
//! Hot paths are the nesting paths that absorbed the most time. They are
//! the first places to look when a measured session runs long.

use crate::aggregator::event::EventRecord;
use crate::clock::TimeUnit;
use log::debug;

/// One ranked path with its total duration and share of the session
///
/// **Public** - returned from hot_paths
#[derive(Debug, Clone, PartialEq)]
pub struct HotSpot {
    /// Fully-qualified dotted path
    pub path: String,

    /// Total accumulated duration, in the requested unit
    pub time: u64,

    /// Percentage of the session total (top-level records only)
    pub percentage: f64,
}

/// Rank completed records by accumulated duration
///
/// **Public** - main entry point for hot path ranking
///
/// # Arguments
/// * `records` - completed records, any order
/// * `resolution` - unit for the returned durations
/// * `top_n` - number of paths to return
///
/// # Returns
/// Up to `top_n` hot spots, longest first
pub fn hot_paths(records: &[&EventRecord], resolution: TimeUnit, top_n: usize) -> Vec<HotSpot> {
    debug!("Ranking {} paths, keeping top {}", records.len(), top_n);

    // The session wall is the sum of top-level records only; nested
    // records already sit inside their parents' durations.
    let session_raw: u64 = records
        .iter()
        .filter(|record| record.parent().is_none())
        .map(|record| record.raw_duration())
        .sum();

    let mut ranked: Vec<&&EventRecord> = records.iter().collect();
    ranked.sort_by(|a, b| b.raw_duration().cmp(&a.raw_duration()));

    ranked
        .into_iter()
        .take(top_n)
        .map(|record| HotSpot {
            path: record.path(),
            time: record.time_in(resolution),
            percentage: if session_raw > 0 {
                (record.raw_duration() as f64 / session_raw as f64) * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
