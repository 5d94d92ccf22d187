//! Configuration and constants shared across the crate.

/// Name used when an event is started or stopped without an explicit name
pub const DEFAULT_EVENT_NAME: &str = "stopwatch";

/// Separator between ancestor names in a fully-qualified event path
pub const PATH_SEPARATOR: char = '.';

/// Minimum width event paths are padded to in text reports
pub const REPORT_PATH_WIDTH: usize = 24;

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Bounds for the measure command
pub const MAX_MEASURE_RUNS: u32 = 1000;
