//! XLSX reader

mod address;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use bomcalc_core::{Cell, RawSheets, Row};

pub use address::parse_cell_ref;

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '_' {
            result.push(c);
            continue;
        }

        let mut hex_chars = String::new();
        let mut saw_x = false;
        let mut decoded = None;

        if chars.peek() == Some(&'x') {
            chars.next();
            saw_x = true;

            while hex_chars.len() < 4 {
                match chars.peek() {
                    Some(&ch) if ch.is_ascii_hexdigit() => {
                        hex_chars.push(ch);
                        chars.next();
                    }
                    _ => break,
                }
            }

            if hex_chars.len() == 4 && chars.peek() == Some(&'_') {
                chars.next();
                decoded = u32::from_str_radix(&hex_chars, 16)
                    .ok()
                    .and_then(char::from_u32);
                if decoded.is_none() {
                    // keep the consumed closing underscore visible
                    hex_chars.push('_');
                }
            }
        }

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                result.push('_');
                if saw_x {
                    result.push('x');
                }
                result.push_str(&hex_chars);
            }
        }
    }

    result
}

/// XLSX workbook reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read every sheet of a workbook file
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<RawSheets> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read every sheet of an in-memory workbook
    pub fn read_bytes(bytes: &[u8]) -> XlsxResult<RawSheets> {
        Self::read(Cursor::new(bytes))
    }

    /// Read every sheet of a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<RawSheets> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut sheets = RawSheets::new();
        for (name, r_id) in &sheet_info {
            match sheet_paths.get(r_id) {
                Some(path) => {
                    let rows = Self::read_worksheet(&mut archive, path, &shared_strings)?;
                    tracing::debug!(sheet = %name, rows = rows.len(), "read worksheet");
                    sheets.push(name.clone(), rows);
                }
                None => {
                    tracing::warn!(sheet = %name, r_id = %r_id, "sheet has no worksheet part, skipped")
                }
            }
        }

        Ok(sheets)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    let text = e.unescape()?;
                    current_string.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and rIds, in workbook order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let name = attr_value(&e, b"name");
                    let r_id = attr_value(&e, b"r:id");
                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to map worksheet rIds to part paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read one worksheet into a dense, possibly ragged grid of rows
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
    ) -> XlsxResult<Vec<Row>> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut grid: Vec<Row> = Vec::new();

        // Position used for rows and cells without an `r` attribute
        let mut current_row: Option<u32> = None;
        let mut next_col: u32 = 0;

        // Current cell state
        let mut cell_pos: (u32, u32) = (0, 0);
        let mut cell_type: Option<String> = None;
        let mut value = String::new();
        let mut has_value = false;
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Some(Self::row_index(&e, current_row)?);
                        next_col = 0;
                    }
                    b"c" => {
                        in_cell = true;
                        cell_pos = Self::cell_position(&e, current_row, next_col)?;
                        cell_type = attr_value(&e, b"t");
                        value.clear();
                        has_value = false;
                    }
                    b"v" if in_cell => {
                        in_value = true;
                        has_value = true;
                    }
                    b"is" if in_cell => {
                        in_inline_str = true;
                        has_value = true;
                    }
                    b"t" if in_inline_str => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        current_row = Some(Self::row_index(&e, current_row)?);
                        next_col = 0;
                    }
                    b"c" => {
                        let (_, col) = Self::cell_position(&e, current_row, next_col)?;
                        next_col = col + 1;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if has_value {
                            let cell = Self::cell_value(cell_type.as_deref(), &value, shared_strings)?;
                            place(&mut grid, cell_pos, cell);
                        }
                        next_col = cell_pos.1 + 1;
                        in_cell = false;
                    }
                    b"v" => in_value = false,
                    b"is" => in_inline_str = false,
                    b"t" if in_inline_str => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    let text = e.unescape()?;
                    value.push_str(&text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(grid)
    }

    /// 0-based index of a `<row>`, following the previous row when `r` is absent
    fn row_index(e: &BytesStart, previous: Option<u32>) -> XlsxResult<u32> {
        let row = match attr_value(e, b"r") {
            Some(r) => {
                let n: u32 = r
                    .parse()
                    .map_err(|_| XlsxError::Parse(format!("Invalid row number '{}'", r)))?;
                if n == 0 || n > crate::MAX_ROWS {
                    return Err(XlsxError::Parse(format!("Row number {} out of range", n)));
                }
                n - 1
            }
            None => previous.map_or(0, |p| p + 1),
        };
        Ok(row)
    }

    /// 0-based position of a `<c>`, from its `r` attribute or the running position
    fn cell_position(
        e: &BytesStart,
        current_row: Option<u32>,
        next_col: u32,
    ) -> XlsxResult<(u32, u32)> {
        match attr_value(e, b"r") {
            Some(r) => parse_cell_ref(&r).ok_or_else(|| {
                XlsxError::Parse(format!("Invalid cell reference '{}'", r))
            }),
            None => {
                if next_col >= crate::MAX_COLS {
                    return Err(XlsxError::Parse("Too many cells in row".into()));
                }
                Ok((current_row.unwrap_or(0), next_col))
            }
        }
    }

    /// Turn a cell's raw value into a [`Cell`] according to its type attribute
    fn cell_value(cell_type: Option<&str>, value: &str, shared_strings: &[String]) -> XlsxResult<Cell> {
        let cell = match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = value.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                Cell::text(s)
            }

            // Boolean
            Some("b") => Cell::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

            // Errors (#N/A, #REF!, ...) are kept as their display text
            Some("e") => Cell::text(value),

            // Inline or formula string - decode Excel escape sequences
            Some("inlineStr") | Some("str") => Cell::text(decode_excel_escapes(value)),

            // ISO 8601 date
            Some("d") => Cell::text(value),

            // Number (default type or explicit "n")
            None | Some("n") => match value.trim().parse::<f64>() {
                Ok(n) => Cell::Number(n),
                Err(_) => Cell::text(value),
            },

            Some(other) => {
                tracing::debug!(cell_type = other, "unknown cell type read as text");
                Cell::text(value)
            }
        };
        Ok(cell)
    }
}

fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.to_string()))
}

/// Store a cell in the grid, growing rows and columns with absent cells
fn place(grid: &mut Vec<Row>, (row, col): (u32, u32), cell: Cell) {
    let (row, col) = (row as usize, col as usize);
    if grid.len() <= row {
        grid.resize_with(row + 1, Vec::new);
    }
    let cells = &mut grid[row];
    if cells.len() <= col {
        cells.resize(col + 1, Cell::Absent);
    }
    cells[col] = cell;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("a_x000d__x000a_b"), "a\r\nb");
        assert_eq!(decode_excel_escapes("snake_case"), "snake_case");
        assert_eq!(decode_excel_escapes("_x005f_"), "_");
        assert_eq!(decode_excel_escapes("_x12_"), "_x12_");
        assert_eq!(decode_excel_escapes("_xZZZZ_"), "_xZZZZ_");
        assert_eq!(decode_excel_escapes("end_"), "end_");
    }

    #[test]
    fn test_cell_value_types() {
        let strings = vec!["Red".to_string()];
        assert_eq!(
            XlsxReader::cell_value(Some("s"), "0", &strings).unwrap(),
            Cell::text("Red")
        );
        assert_eq!(
            XlsxReader::cell_value(None, "12.5", &strings).unwrap(),
            Cell::Number(12.5)
        );
        assert_eq!(
            XlsxReader::cell_value(Some("b"), "1", &strings).unwrap(),
            Cell::Boolean(true)
        );
        assert_eq!(
            XlsxReader::cell_value(Some("e"), "#N/A", &strings).unwrap(),
            Cell::text("#N/A")
        );
        assert!(XlsxReader::cell_value(Some("s"), "3", &strings).is_err());
    }

    #[test]
    fn test_place_grows_grid() {
        let mut grid = Vec::new();
        place(&mut grid, (2, 3), Cell::from(1));
        place(&mut grid, (0, 0), Cell::from("a"));

        assert_eq!(grid.len(), 3);
        assert!(grid[1].is_empty());
        assert_eq!(grid[2], vec![Cell::Absent, Cell::Absent, Cell::Absent, Cell::Number(1.0)]);
        assert_eq!(grid[0], vec![Cell::text("a")]);
    }
}
