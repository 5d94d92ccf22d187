//! Time unit arithmetic and the two clock source variants.
//!
//! The resolution a stopwatch is built with decides which clock backs it:
//! nanosecond and microsecond resolutions read a monotonic nanosecond clock,
//! everything coarser reads the wall clock in milliseconds. The choice is
//! made once at construction and never re-evaluated.

use crate::utils::error::ParseError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

/// Granularity used for clock reads, duration accounting, and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Suffix appended to rendered durations (e.g. `12ms`, `3s`)
    pub const fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "micros",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "m",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
        }
    }

    const fn nanos_per(self) -> u128 {
        match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60 * 1_000_000_000,
            TimeUnit::Hours => 3_600 * 1_000_000_000,
            TimeUnit::Days => 86_400 * 1_000_000_000,
        }
    }

    /// Convert a value in this unit to another unit.
    ///
    /// Uses truncating integer division: converting 999ms to seconds
    /// yields 0, never 1.
    pub fn convert(self, value: u64, to: TimeUnit) -> u64 {
        let nanos = value as u128 * self.nanos_per();
        (nanos / to.nanos_per()).try_into().unwrap_or(u64::MAX)
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for TimeUnit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ns" | "nanos" | "nanoseconds" => Ok(TimeUnit::Nanoseconds),
            "us" | "micros" | "microseconds" => Ok(TimeUnit::Microseconds),
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "secs" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "min" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hours" => Ok(TimeUnit::Hours),
            "d" | "days" => Ok(TimeUnit::Days),
            other => Err(ParseError::UnknownUnit(other.to_string())),
        }
    }
}

/// Clock backing a stopwatch, fixed at construction
#[derive(Debug, Clone)]
pub enum TimeSource {
    /// Wall-clock milliseconds
    Coarse,

    /// Monotonic nanoseconds, measured from a fixed origin
    Fine { origin: Instant },
}

impl TimeSource {
    /// Select the clock for a reporting resolution.
    ///
    /// Nanosecond and microsecond resolutions need the fine clock;
    /// millisecond and coarser resolutions read the wall clock.
    pub fn for_resolution(resolution: TimeUnit) -> Self {
        match resolution {
            TimeUnit::Nanoseconds | TimeUnit::Microseconds => TimeSource::Fine {
                origin: Instant::now(),
            },
            _ => TimeSource::Coarse,
        }
    }

    /// Current instant in this source's native unit
    pub fn now(&self) -> u64 {
        match self {
            // timestamp_millis() is non-negative for any date after 1970
            TimeSource::Coarse => Utc::now().timestamp_millis() as u64,
            // u64 nanoseconds cover ~584 years of process uptime
            TimeSource::Fine { origin } => origin.elapsed().as_nanos() as u64,
        }
    }

    /// Unit the instants returned by [`now`](Self::now) are measured in
    pub fn native_unit(&self) -> TimeUnit {
        match self {
            TimeSource::Coarse => TimeUnit::Milliseconds,
            TimeSource::Fine { .. } => TimeUnit::Nanoseconds,
        }
    }
}
