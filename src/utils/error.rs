//! Error types for the entire crate.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing user-supplied input
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unknown time unit: {0}")]
    UnknownUnit(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("No completed events to render")]
    EmptyRegistry,

    #[error("Flamegraph width is too small: {0}px")]
    WidthTooSmall(usize),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
