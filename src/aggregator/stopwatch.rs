//! The event stack and path-keyed aggregation engine.
//!
//! A [`Stopwatch`] keeps a LIFO stack of currently-open events and a
//! registry mapping each fully-qualified dotted path to its accumulated
//! record. Starting an event pushes it under the path of the current stack
//! top; stopping a name unwinds the stack down to (and including) the
//! nearest open event with that name, force-closing anything above it.
//!
//! Each instance is one independent measurement session. There is no
//! process-wide state.

use crate::aggregator::event::{EventRecord, OpenEvent};
use crate::clock::{TimeSource, TimeUnit};
use crate::output;
use crate::output::schema::Report;
use crate::utils::config::DEFAULT_EVENT_NAME;
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io;

/// Hierarchical stopwatch: nested named intervals aggregated by path
///
/// **Public** - the main entry point of the crate
///
/// # Example
/// ```
/// use nestwatch::Stopwatch;
///
/// let mut sw = Stopwatch::new();
/// sw.start_named("load");
/// sw.start_named("parse");
/// sw.stop_named("parse");
/// sw.stop_named("load");
///
/// assert!(sw.event("load").is_some());
/// assert!(sw.event("load.parse").is_some());
/// print!("{}", sw.report());
/// ```
#[derive(Debug)]
pub struct Stopwatch {
    /// Currently-open events; push/pop at the tail only
    stack: Vec<OpenEvent>,

    /// Completed records keyed by full path
    registry: HashMap<String, EventRecord>,

    /// Default unit for rendering and `Report` snapshots
    resolution: TimeUnit,

    /// Clock selected once from the resolution
    source: TimeSource,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a stopwatch with the default millisecond resolution
    pub fn new() -> Self {
        Self::with_resolution(TimeUnit::Milliseconds)
    }

    /// Create a stopwatch reporting at `resolution`.
    ///
    /// Nanosecond and microsecond resolutions are backed by the fine
    /// monotonic clock, everything coarser by the wall clock.
    pub fn with_resolution(resolution: TimeUnit) -> Self {
        Self {
            stack: Vec::new(),
            registry: HashMap::new(),
            resolution,
            source: TimeSource::for_resolution(resolution),
        }
    }

    /// Resolution this stopwatch renders and snapshots in
    pub fn resolution(&self) -> TimeUnit {
        self.resolution
    }

    /// Start an event with the default name
    pub fn start(&mut self) {
        self.start_named(DEFAULT_EVENT_NAME);
    }

    /// Start a named event nested under the current stack top.
    ///
    /// Always succeeds. Reusing the name of an ancestor that is still open
    /// simply nests again (`load`, then `load.load`, and so on).
    pub fn start_named(&mut self, name: impl Into<String>) {
        let name = name.into();
        let parent = self.stack.last().map(OpenEvent::path);

        debug!("start {:?} at depth {}", name, self.stack.len());
        self.stack.push(OpenEvent::new(name, parent, self.source.now()));
    }

    /// Stop the default-named event
    pub fn stop(&mut self) -> Option<&EventRecord> {
        self.stop_named(DEFAULT_EVENT_NAME)
    }

    /// Stop the nearest open event with this name.
    ///
    /// Open events above the match are force-closed and merged as well, all
    /// at the single stop instant sampled when this call was made. If no
    /// open event bears the name, nothing changes and `None` is returned.
    ///
    /// Returns the registry record for the matched path after the merge, so
    /// it reflects every completed occurrence so far, not just this one.
    pub fn stop_named(&mut self, name: &str) -> Option<&EventRecord> {
        if !self.stack.iter().any(|event| event.name == name) {
            debug!("stop {:?} ignored: no such open event", name);
            return None;
        }

        // One sample closes the whole unwind: descendants that were never
        // stopped explicitly end at their ancestor's stop instant.
        let stopped_at = self.source.now();
        let native = self.source.native_unit();

        let mut matched_path = None;
        while matched_path.is_none() {
            // The containment check above guarantees a match before the
            // stack runs dry.
            let open = match self.stack.pop() {
                Some(open) => open,
                None => break,
            };

            if open.name == name {
                matched_path = Some(open.path());
            } else {
                debug!("force-closing open descendant {:?}", open.path());
            }

            self.record(open.close(stopped_at, native));
        }

        match matched_path {
            Some(path) => self.registry.get(&path),
            None => None,
        }
    }

    /// Merge a completed event into the registry at its path
    fn record(&mut self, event: EventRecord) {
        match self.registry.entry(event.path()) {
            Entry::Occupied(mut existing) => existing.get_mut().merge(&event),
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
        }
    }

    /// Look up the completed record at a full dotted path.
    ///
    /// An event is invisible here until its first stop; open events live
    /// only on the stack.
    pub fn event(&self, path: &str) -> Option<&EventRecord> {
        self.registry.get(path)
    }

    /// All completed records, sorted by path
    pub fn records(&self) -> Vec<&EventRecord> {
        let mut records: Vec<&EventRecord> = self.registry.values().collect();
        records.sort_by_key(|record| record.path());
        records
    }

    /// Number of events still open on the stack
    pub fn running(&self) -> usize {
        self.stack.len()
    }

    /// Name of the most recently started event that is still open
    pub fn top_open_name(&self) -> Option<&str> {
        self.stack.last().map(|event| event.name.as_str())
    }

    /// Render the report to a string
    pub fn report(&self) -> String {
        output::text::render_report(self)
    }

    /// Write the report to any sink, one line per completed path
    pub fn write_report<W: io::Write>(&self, sink: &mut W) -> io::Result<()> {
        output::text::write_report(self, sink)
    }

    /// Snapshot the registry into a serializable report
    pub fn to_report(&self) -> Report {
        Report::from_stopwatch(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    // Sleep-based assertions use a generous upper slack so loaded test
    // machines do not produce flaky failures.
    const OP_MS: u64 = 60;
    const SLACK_MS: u64 = 400;

    fn work(ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }

    fn assert_between(actual: u64, at_least: u64, slack: u64) {
        assert!(
            actual >= at_least && actual < at_least + slack,
            "expected {} in [{}, {})",
            actual,
            at_least,
            at_least + slack
        );
    }

    #[test]
    fn test_default_event() {
        let mut sw = Stopwatch::new();
        sw.start();
        work(OP_MS);
        sw.stop();

        let event = sw.event(DEFAULT_EVENT_NAME).expect("default event recorded");
        assert_eq!(event.count(), 1);
        assert_between(event.time_in(TimeUnit::Milliseconds), OP_MS, SLACK_MS);
    }

    #[test]
    fn test_named_event() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");
        work(OP_MS);
        sw.stop_named("unittest");

        assert!(sw.event(DEFAULT_EVENT_NAME).is_none());

        let event = sw.event("unittest").expect("named event recorded");
        assert_eq!(event.count(), 1);
        assert_between(event.time_in(TimeUnit::Milliseconds), OP_MS, SLACK_MS);
    }

    #[test]
    fn test_single_nested_event() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");
        work(OP_MS);
        sw.start_named("nest");
        work(OP_MS);
        sw.stop_named("nest");
        work(OP_MS);
        sw.stop_named("unittest");

        let outer = sw.event("unittest").unwrap().time_in(TimeUnit::Milliseconds);
        let inner = sw.event("unittest.nest").unwrap().time_in(TimeUnit::Milliseconds);

        assert_between(outer, OP_MS * 3, SLACK_MS);
        assert_between(inner, OP_MS, SLACK_MS);
        assert!(outer >= inner);

        // Nothing still running, so no summary line
        assert!(!sw.report().contains('('));
    }

    #[test]
    fn test_double_nested_event() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");
        work(OP_MS);
        sw.start_named("nest");
        work(OP_MS);
        sw.start_named("deeper");
        work(OP_MS);
        sw.stop_named("deeper");
        work(OP_MS);
        sw.stop_named("nest");
        work(OP_MS);
        sw.stop_named("unittest");

        assert_between(
            sw.event("unittest").unwrap().time_in(TimeUnit::Milliseconds),
            OP_MS * 5,
            SLACK_MS,
        );
        assert_between(
            sw.event("unittest.nest").unwrap().time_in(TimeUnit::Milliseconds),
            OP_MS * 3,
            SLACK_MS,
        );
        assert_between(
            sw.event("unittest.nest.deeper").unwrap().time_in(TimeUnit::Milliseconds),
            OP_MS,
            SLACK_MS,
        );
    }

    #[test]
    fn test_repeated_nested_event_merges() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");
        work(OP_MS);
        sw.start_named("nest");
        work(OP_MS);
        sw.stop_named("nest");
        work(OP_MS);
        sw.start_named("nest");
        work(OP_MS);
        sw.stop_named("nest");
        work(OP_MS);
        sw.stop_named("unittest");

        let nest = sw.event("unittest.nest").unwrap();
        assert_eq!(nest.count(), 2);
        assert_between(nest.time_in(TimeUnit::Milliseconds), OP_MS * 2, SLACK_MS);

        assert!(sw.report().contains("(2 @ "));
    }

    #[test]
    fn test_stop_returns_merged_record() {
        let mut sw = Stopwatch::new();
        sw.start_named("x");
        sw.stop_named("x");
        sw.start_named("x");

        let record = sw.stop_named("x").expect("second stop matches");
        assert_eq!(record.count(), 2);
        assert_eq!(record.path(), "x");

        // The returned reference is the registry entry itself
        assert_eq!(sw.event("x").unwrap().count(), 2);
    }

    #[test]
    fn test_ancestor_stop_closes_open_descendants() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");
        work(OP_MS);
        sw.start_named("nest");
        work(OP_MS);
        // no stop_named("nest")
        work(OP_MS);
        sw.stop_named("unittest");

        assert_between(
            sw.event("unittest").unwrap().time_in(TimeUnit::Milliseconds),
            OP_MS * 3,
            SLACK_MS,
        );

        // nest was never stopped explicitly, so it closed at unittest's
        // stop instant and spans the remaining two sleeps
        assert_between(
            sw.event("unittest.nest").unwrap().time_in(TimeUnit::Milliseconds),
            OP_MS * 2,
            SLACK_MS,
        );
        assert_eq!(sw.running(), 0);
    }

    #[test]
    fn test_unmatched_stop_is_a_no_op() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");

        assert!(sw.stop_named("never-started").is_none());

        // The open event is untouched and still stoppable
        assert_eq!(sw.running(), 1);
        assert!(sw.event("unittest").is_none());
        assert!(sw.stop_named("unittest").is_some());
    }

    #[test]
    fn test_stop_on_empty_stack() {
        let mut sw = Stopwatch::new();
        assert!(sw.stop().is_none());
        assert!(sw.stop_named("anything").is_none());
        assert_eq!(sw.running(), 0);
    }

    #[test]
    fn test_reentrant_same_name_nests() {
        let mut sw = Stopwatch::new();
        sw.start_named("a");
        sw.start_named("a");

        // The inner occurrence matches first
        let inner = sw.stop_named("a").unwrap();
        assert_eq!(inner.path(), "a.a");
        assert_eq!(sw.running(), 1);

        let outer = sw.stop_named("a").unwrap();
        assert_eq!(outer.path(), "a");
        assert!(sw.event("a.a").is_some());
        assert!(sw.event("a").is_some());
    }

    #[test]
    fn test_records_sorted_by_path() {
        let mut sw = Stopwatch::new();
        for name in ["zebra", "alpha", "mid"] {
            sw.start_named(name);
            sw.stop_named(name);
        }

        let paths: Vec<String> = sw.records().iter().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["alpha", "mid", "zebra"]);
    }

    #[test]
    fn test_report_summary_one_still_running() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");

        assert!(sw.event("unittest").is_none());
        assert!(sw.report().contains("1 event is still running: unittest"));
    }

    #[test]
    fn test_report_summary_two_still_running() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");
        sw.start_named("nest");

        assert!(sw.report().contains("2 events are still running"));
    }

    #[test]
    fn test_report_never_closes_open_events() {
        let mut sw = Stopwatch::new();
        sw.start_named("unittest");
        let _ = sw.report();

        assert_eq!(sw.running(), 1);
        assert!(sw.event("unittest").is_none());
    }

    #[test]
    fn test_fine_resolution_end_to_end() {
        let mut sw = Stopwatch::with_resolution(TimeUnit::Nanoseconds);
        sw.start();
        work(1);
        sw.stop();

        let event = sw.event(DEFAULT_EVENT_NAME).unwrap();
        // ~1ms of sleep is at least a million nanoseconds
        assert!(event.time_in(TimeUnit::Nanoseconds) >= 1_000_000);
        assert!(sw.report().contains("ns"));
    }

    #[test]
    fn test_second_resolution_truncates_to_zero() {
        let mut sw = Stopwatch::with_resolution(TimeUnit::Seconds);
        sw.start();
        work(1);
        sw.stop();

        let event = sw.event(DEFAULT_EVENT_NAME).unwrap();
        assert_eq!(event.time_in(TimeUnit::Seconds), 0);
        assert!(sw.report().contains("0s"));
    }
}
