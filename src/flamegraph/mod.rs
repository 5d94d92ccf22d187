//! Flame graph rendering of aggregated event paths.
//!
//! Converts the registry's dotted paths into a self-contained SVG where
//! frame widths are proportional to accumulated duration.

pub mod generator;

// Re-export main types
pub use generator::{generate_flamegraph, FlamegraphConfig};
