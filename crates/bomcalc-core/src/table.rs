//! Tables, datasets and the raw sheet grid they are built from

use crate::cell::Cell;

/// An ordered sequence of cells; the meaning of each position depends on the table
pub type Row = Vec<Cell>;

/// A sheet's normalized content: one header row plus data rows of the same width
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    header: Row,
    rows: Vec<Row>,
}

impl Table {
    /// Create a table from a header and data rows
    ///
    /// Callers are expected to pass rows of the header's width; the
    /// normalizer always does.
    pub fn new(header: Row, rows: Vec<Row>) -> Self {
        Self { header, rows }
    }

    /// Column labels
    pub fn header(&self) -> &[Cell] {
        &self.header
    }

    /// Data rows in source order
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Get a data row by index
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Get a data cell, or `None` when the row or column is out of range
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column labels rendered as text
    pub fn labels(&self) -> Vec<String> {
        self.header.iter().map(|c| c.to_string()).collect()
    }
}

/// Mapping from sheet name to normalized table, in workbook order
///
/// A dataset is built once per load and never mutated afterwards. The empty
/// dataset is valid and stands for "nothing loaded yet".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    sheets: Vec<(String, Table)>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a table by exact sheet name
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, table)| table)
    }

    /// Check if a sheet is present
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over (name, table) pairs in workbook order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.sheets.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Check if no sheet was loaded
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl FromIterator<(String, Table)> for Dataset {
    /// Collect tables into a dataset; a repeated name keeps its first table
    fn from_iter<I: IntoIterator<Item = (String, Table)>>(iter: I) -> Self {
        let mut sheets: Vec<(String, Table)> = Vec::new();
        for (name, table) in iter {
            if sheets.iter().any(|(n, _)| *n == name) {
                tracing::debug!(sheet = %name, "duplicate sheet name ignored");
                continue;
            }
            sheets.push((name, table));
        }
        Self { sheets }
    }
}

/// The raw cell grid of every sheet in a workbook, as handed over by a loader
///
/// Rows may be ragged; trailing cells a loader did not see are simply missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheets {
    sheets: Vec<(String, Vec<Row>)>,
}

impl RawSheets {
    /// Create an empty set of sheets
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any sheet with the same name
    pub fn push<S: Into<String>>(&mut self, name: S, rows: Vec<Row>) {
        let name = name.into();
        if let Some(existing) = self.sheets.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = rows;
        } else {
            self.sheets.push((name, rows));
        }
    }

    /// Builder-style [`RawSheets::push`]
    pub fn with_sheet<S: Into<String>>(mut self, name: S, rows: Vec<Row>) -> Self {
        self.push(name, rows);
        self
    }

    /// Get the rows of a sheet by exact name
    pub fn get(&self, name: &str) -> Option<&[Row]> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows.as_slice())
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over (name, rows) pairs in workbook order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Row])> {
        self.sheets.iter().map(|(n, r)| (n.as_str(), r.as_slice()))
    }

    /// Number of sheets
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Check if there are no sheets
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
