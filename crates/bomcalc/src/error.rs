//! Error types for the bomcalc facade

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Why a workbook could not be read
#[derive(Debug, Error)]
pub enum LoadError {
    /// XLSX reader error
    #[cfg(feature = "xlsx")]
    #[error(transparent)]
    Xlsx(#[from] bomcalc_xlsx::XlsxError),

    /// CSV reader error
    #[error(transparent)]
    Csv(#[from] bomcalc_csv::CsvError),

    /// File extension with no reader
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Errors surfaced to callers of the engine
///
/// Bad cells, missing sheets and unknown codes are not errors; they yield
/// fallback values and empty results. Only a workbook that cannot be read
/// at all, an unusable configuration, or a failed export end up here.
#[derive(Debug, Error)]
pub enum Error {
    /// The workbook could not be turned into a dataset
    #[error("Failed to load '{}': {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    /// Configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] bomcalc_core::Error),

    /// Export text could not be produced
    #[error("Export failed: {0}")]
    Export(#[source] bomcalc_csv::CsvError),
}

impl Error {
    /// Check if this is a load failure
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Error::Load { .. })
    }
}
