//! Row normalization: raw ragged rows to a fixed-width table

use crate::cell::Cell;
use crate::table::{Row, Table};

/// Project a raw sheet onto a fixed set of columns.
///
/// The header is `sheet_rows[header_row]`; data rows run from `data_start` to
/// the end of the sheet. `keep_columns` gives the output column order and may
/// repeat or exceed the source width.
///
/// Header cells that are missing become empty text so labels stay printable.
/// Data cells that are missing or empty text become [`Cell::Absent`]. Every
/// source row from `data_start` on produces exactly one output row, including
/// fully empty ones.
pub fn normalize(
    sheet_rows: &[Row],
    header_row: usize,
    data_start: usize,
    keep_columns: &[usize],
) -> Table {
    let header = match sheet_rows.get(header_row) {
        Some(row) => project_header(row, keep_columns),
        None => vec![Cell::text(""); keep_columns.len()],
    };

    let rows = sheet_rows
        .get(data_start..)
        .unwrap_or_default()
        .iter()
        .map(|row| project_row(row, keep_columns))
        .collect();

    Table::new(header, rows)
}

fn project_header(row: &[Cell], keep_columns: &[usize]) -> Row {
    keep_columns
        .iter()
        .map(|&col| match row.get(col) {
            Some(Cell::Absent) | None => Cell::text(""),
            Some(cell) => cell.clone(),
        })
        .collect()
}

fn project_row(row: &[Cell], keep_columns: &[usize]) -> Row {
    keep_columns
        .iter()
        .map(|&col| match row.get(col) {
            Some(Cell::Text(s)) if s.is_empty() => Cell::Absent,
            Some(cell) => cell.clone(),
            None => Cell::Absent,
        })
        .collect()
}
