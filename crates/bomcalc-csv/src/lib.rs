//! # bomcalc-csv
//!
//! CSV support for bomcalc:
//! - [`FormulationWriter`] - the formulation export text and its clipboard variant
//! - [`CsvSheetReader`] - a CSV file as a single raw sheet

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::CsvSheetReader;
pub use writer::{export_file_name, FormulationWriter};
