//! Open events and completed event records.
//!
//! An event exists in two forms. While it sits on the stopwatch stack it is
//! an [`OpenEvent`] holding its start instant. Once stopped it becomes an
//! [`EventRecord`], the per-path accumulator that all later occurrences of
//! the same path merge into.

use crate::clock::TimeUnit;
use crate::utils::config::{PATH_SEPARATOR, REPORT_PATH_WIDTH};

/// An event that has been started but not yet stopped
///
/// Lives only on the stopwatch stack; never visible to callers.
#[derive(Debug, Clone)]
pub(crate) struct OpenEvent {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) started_at: u64,
}

impl OpenEvent {
    pub(crate) fn new(name: impl Into<String>, parent: Option<String>, started_at: u64) -> Self {
        Self {
            name: name.into(),
            parent,
            started_at,
        }
    }

    /// Fully-qualified dotted path of this event
    pub(crate) fn path(&self) -> String {
        join_path(self.parent.as_deref(), &self.name)
    }

    /// Close the event at `stopped_at`, producing a single-occurrence record.
    ///
    /// The subtraction saturates: the coarse wall clock may step backwards.
    pub(crate) fn close(self, stopped_at: u64, native: TimeUnit) -> EventRecord {
        EventRecord {
            name: self.name,
            parent: self.parent,
            native,
            raw: stopped_at.saturating_sub(self.started_at),
            count: 1,
        }
    }
}

/// Accumulated timings for one distinct nesting path
///
/// **Public** - returned from stopwatch lookups and stops
#[derive(Debug, Clone)]
pub struct EventRecord {
    name: String,
    parent: Option<String>,
    native: TimeUnit,
    raw: u64,
    count: u32,
}

impl EventRecord {
    /// Name the event was started with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the enclosing event, if this event started while one was open
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Fully-qualified dotted path, the aggregation key
    pub fn path(&self) -> String {
        join_path(self.parent.as_deref(), &self.name)
    }

    /// Number of completed start/stop pairs merged into this path
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Accumulated duration in the clock's native unit
    pub fn raw_duration(&self) -> u64 {
        self.raw
    }

    /// Unit [`raw_duration`](Self::raw_duration) is measured in
    pub fn native_unit(&self) -> TimeUnit {
        self.native
    }

    /// Accumulated duration converted to `unit` (truncating)
    pub fn time_in(&self, unit: TimeUnit) -> u64 {
        self.native.convert(self.raw, unit)
    }

    /// Fold another completed occurrence of the same path into this record.
    ///
    /// Sums raw native-unit durations and counts; averages are derived at
    /// render time, never stored.
    pub(crate) fn merge(&mut self, other: &EventRecord) {
        self.raw += other.raw;
        self.count += other.count;
    }

    /// One report line: padded path, total duration, and for recurring
    /// paths the occurrence count with the mean duration.
    pub fn render(&self, resolution: TimeUnit) -> String {
        let total = self.time_in(resolution);

        if self.count < 2 {
            return format!(
                "{:<width$} {}{}",
                self.path(),
                total,
                resolution.suffix(),
                width = REPORT_PATH_WIDTH
            );
        }

        let mean = total / u64::from(self.count);
        format!(
            "{:<width$} {}{} ({} @ {}{})",
            self.path(),
            total,
            resolution.suffix(),
            self.count,
            mean,
            resolution.suffix(),
            width = REPORT_PATH_WIDTH
        )
    }
}

/// Derive a full path from an optional parent path and a name
fn join_path(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{}{}{}", parent, PATH_SEPARATOR, name),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open(name: &str, parent: Option<&str>, started_at: u64) -> OpenEvent {
        OpenEvent::new(name, parent.map(String::from), started_at)
    }

    #[test]
    fn test_path_without_parent() {
        assert_eq!(open("load", None, 0).path(), "load");
    }

    #[test]
    fn test_path_with_parent() {
        assert_eq!(open("query", Some("load"), 0).path(), "load.query");
        assert_eq!(open("parse", Some("load.query"), 0).path(), "load.query.parse");
    }

    #[test]
    fn test_close_produces_single_occurrence() {
        let record = open("load", None, 100).close(250, TimeUnit::Milliseconds);

        assert_eq!(record.count(), 1);
        assert_eq!(record.raw_duration(), 150);
        assert_eq!(record.native_unit(), TimeUnit::Milliseconds);
        assert_eq!(record.path(), "load");
    }

    #[test]
    fn test_close_saturates_on_clock_stepback() {
        let record = open("load", None, 500).close(400, TimeUnit::Milliseconds);
        assert_eq!(record.raw_duration(), 0);
    }

    #[test]
    fn test_merge_sums_durations_and_counts() {
        let mut record = open("load", None, 0).close(120, TimeUnit::Milliseconds);
        let other = open("load", None, 0).close(80, TimeUnit::Milliseconds);

        record.merge(&other);

        assert_eq!(record.raw_duration(), 200);
        assert_eq!(record.count(), 2);
    }

    #[test]
    fn test_time_in_converts_from_native_unit() {
        let record = open("load", None, 0).close(1_500_000, TimeUnit::Nanoseconds);

        assert_eq!(record.time_in(TimeUnit::Nanoseconds), 1_500_000);
        assert_eq!(record.time_in(TimeUnit::Microseconds), 1500);
        assert_eq!(record.time_in(TimeUnit::Milliseconds), 1);
        assert_eq!(record.time_in(TimeUnit::Seconds), 0);
    }

    #[test]
    fn test_render_single_occurrence() {
        let record = open("load", None, 0).close(42, TimeUnit::Milliseconds);

        assert_eq!(record.render(TimeUnit::Milliseconds), format!("{:<24} 42ms", "load"));
    }

    #[test]
    fn test_render_pads_path_to_minimum_width() {
        let record = open("x", None, 0).close(1, TimeUnit::Milliseconds);
        let line = record.render(TimeUnit::Milliseconds);

        assert_eq!(&line[..24], format!("{:<24}", "x"));
    }

    #[test]
    fn test_render_recurring_appends_count_and_mean() {
        let mut record = open("load", Some("job"), 0).close(30, TimeUnit::Milliseconds);
        record.merge(&open("load", Some("job"), 0).close(10, TimeUnit::Milliseconds));

        let line = record.render(TimeUnit::Milliseconds);

        assert!(line.starts_with(&format!("{:<24}", "job.load")));
        assert!(line.ends_with("40ms (2 @ 20ms)"));
    }

    #[test]
    fn test_render_truncates_at_coarse_resolution() {
        let record = open("load", None, 0).close(900, TimeUnit::Milliseconds);
        let line = record.render(TimeUnit::Seconds);

        assert!(line.ends_with("0s"));
    }
}
