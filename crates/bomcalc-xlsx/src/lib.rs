//! # bomcalc-xlsx
//!
//! XLSX (Office Open XML) reader for bomcalc.
//!
//! Reads every worksheet of a workbook into a dense grid of [`Cell`](bomcalc_core::Cell)
//! values, in workbook order. Styles, comments and formulas are ignored; formula
//! cells contribute their cached value.

pub mod error;
pub mod reader;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;
