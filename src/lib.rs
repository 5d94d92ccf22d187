//! Nestwatch
//!
//! Hierarchical interval timing: callers mark the start and end of named
//! events, which may nest inside one another, and the stopwatch
//! accumulates elapsed duration and occurrence counts per distinct
//! nesting path.
//!
//! This crate provides the library behind the `nestwatch` CLI tool and a
//! public API for embedding:
//!
//! ```
//! use nestwatch::{Stopwatch, TimeUnit};
//!
//! let mut sw = Stopwatch::with_resolution(TimeUnit::Microseconds);
//!
//! sw.start_named("request");
//! sw.start_named("db");
//! sw.stop_named("db");
//! sw.stop_named("request");
//!
//! assert_eq!(sw.event("request.db").unwrap().count(), 1);
//! print!("{}", sw.report());
//! ```
//!
//! Stopping a name that is open deeper on the stack force-closes every
//! event above it at the same instant, so a forgotten inner stop never
//! leaks an open event past its ancestor.

pub mod aggregator;
pub mod clock;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod utils;

// Root re-exports for the common embedding surface
pub use aggregator::{hot_paths, EventRecord, HotSpot, Stopwatch};
pub use clock::TimeUnit;
pub use output::{Report, ReportEntry};
pub use utils::config::DEFAULT_EVENT_NAME;
