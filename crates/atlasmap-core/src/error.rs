//! Error types for atlas mapping operations.
//!
//! One taxonomy is shared across the workspace: configuration problems are
//! caught before any I/O or engine work starts, validation problems cover
//! malformed data and out-of-range requests, and engine/parse failures abort
//! the run without promoting partial results.

use crate::frame::Frame;
use thiserror::Error;

/// Main error type for atlas mapping operations.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Bad orientation code, missing required file, axis-count mismatch.
    /// Detected at startup, before any expensive work.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed metadata, out-of-range level index, malformed point file.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A point set entered a transform stage declared for a different frame.
    #[error("Frame mismatch: stage expects points in frame '{expected}', got '{actual}'")]
    FrameMismatch { expected: Frame, actual: Frame },

    /// Storage or filesystem failure. Retry policy belongs to the caller;
    /// once it reaches this crate it is terminal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external resampling engine failed or produced no usable output.
    /// Never retried automatically.
    #[error("Engine error: {0}")]
    Engine(String),

    /// A result table was present but did not match the expected
    /// labeled-group structure.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for atlas mapping operations.
pub type Result<T> = std::result::Result<T, AtlasError>;

impl AtlasError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a frame mismatch error.
    pub fn frame_mismatch(expected: Frame, actual: Frame) -> Self {
        Self::FrameMismatch { expected, actual }
    }

    /// Create an engine error.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
