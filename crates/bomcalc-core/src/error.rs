//! Error types for bomcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bomcalc-core
///
/// Per-cell and per-row anomalies never surface here; they degrade to a
/// fallback value where they occur. Only configuration problems do.
#[derive(Debug, Error)]
pub enum Error {
    /// A sheet rule whose data rows would start at or before its header row
    #[error("Invalid sheet rule '{designator}': data start {data_start} must be after header row {header_row}")]
    InvalidSheetRule {
        designator: String,
        header_row: usize,
        data_start: usize,
    },

    /// Formulation group size of zero
    #[error("Group size must be greater than zero")]
    ZeroGroupSize,

    /// Target mass that is not a positive finite number
    #[error("Target mass must be a positive number, got {0}")]
    InvalidTargetMass(f64),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error with a message
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }
}
