//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;
use bomcalc_core::{Cell, RawSheets, Row};

/// Reads a CSV file as one raw sheet
///
/// Every record becomes a row, the first one included; header offsets are
/// the sheet rules' business.
pub struct CsvSheetReader;

impl CsvSheetReader {
    /// Read a CSV file as a workbook with one sheet named after the file stem
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<RawSheets> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Sheet1")
            .to_string();
        let rows = Self::read(File::open(path)?, options)?;
        Ok(RawSheets::new().with_sheet(name, rows))
    }

    /// Read CSV records from a reader into rows
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Vec<Row>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            let row = record
                .iter()
                .map(|field| {
                    if options.auto_detect_types {
                        Self::detect_type(field)
                    } else if field.is_empty() {
                        Cell::Absent
                    } else {
                        Cell::text(field)
                    }
                })
                .collect();
            rows.push(row);
        }

        Ok(rows)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> Cell {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return Cell::Absent;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return Cell::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Cell::Boolean(false);
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return Cell::Number(n);
            }
        }

        Cell::text(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_type() {
        assert_eq!(CsvSheetReader::detect_type(""), Cell::Absent);
        assert_eq!(CsvSheetReader::detect_type(" 12.5 "), Cell::Number(12.5));
        assert_eq!(CsvSheetReader::detect_type("TRUE"), Cell::Boolean(true));
        assert_eq!(CsvSheetReader::detect_type("C100"), Cell::text("C100"));
        assert_eq!(CsvSheetReader::detect_type("inf"), Cell::text("inf"));
    }

    #[test]
    fn test_read_ragged_records() {
        let data = "Code,Weight\nC1,10\nC2\n,,x\n";
        let rows = CsvSheetReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], vec![Cell::text("Code"), Cell::text("Weight")]);
        assert_eq!(rows[1], vec![Cell::text("C1"), Cell::Number(10.0)]);
        assert_eq!(rows[2], vec![Cell::text("C2")]);
        assert_eq!(rows[3], vec![Cell::Absent, Cell::Absent, Cell::text("x")]);
    }

    #[test]
    fn test_read_without_type_detection() {
        let options = CsvReadOptions {
            auto_detect_types: false,
            delimiter: b';',
            ..Default::default()
        };
        let rows = CsvSheetReader::read("C1;10;".as_bytes(), &options).unwrap();
        assert_eq!(rows[0], vec![Cell::text("C1"), Cell::text("10"), Cell::Absent]);
    }
}
