//! Error types for the cell codec and the filter rewriter.

use crate::grid::GridScheme;
use thiserror::Error;

/// Errors raised while encoding coordinates or rewriting a query.
///
/// None of these are transient. They point at bad caller input or at a
/// configuration whose resolution and truncation window do not fit together.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    /// Latitude or longitude is non-finite or out of range.
    #[error("Invalid coordinate ({latitude}, {longitude}): {reason}")]
    InvalidCoordinate {
        latitude: f64,
        longitude: f64,
        reason: String,
    },

    /// Resolution outside the range supported by the grid scheme.
    #[error("Invalid resolution {resolution} for {scheme} grid: supported range is {min}..={max}")]
    InvalidResolution {
        scheme: GridScheme,
        resolution: u8,
        min: u8,
        max: u8,
    },

    /// A coordinate string could not be split into two numbers.
    #[error("Malformed coordinate string '{value}': {reason}")]
    MalformedCoordinateString { value: String, reason: String },

    /// Truncation window does not fit inside the canonical identifier.
    #[error(
        "Truncation window offset {offset} + length {length} exceeds identifier length {available}"
    )]
    TruncationRangeError {
        offset: usize,
        length: usize,
        available: usize,
    },

    /// Rewrite configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Rewrite configuration could not be deserialized.
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),
}

/// Result type for codec and rewrite operations.
pub type Result<T> = std::result::Result<T, RewriteError>;

impl From<serde_json::Error> for RewriteError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for RewriteError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}
