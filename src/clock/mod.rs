//! Time units and clock sources.
//!
//! This module handles:
//! - The `TimeUnit` enum shared by resolutions and rendering
//! - Truncating conversion between units
//! - Selecting the coarse or fine clock source from a resolution

pub mod source;

// Re-export main types
pub use source::{TimeSource, TimeUnit};
