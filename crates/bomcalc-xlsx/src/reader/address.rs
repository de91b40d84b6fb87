//! A1-style cell references

use crate::{MAX_COLS, MAX_ROWS};

/// Parse an A1-style reference (`"B7"`, `"$AP$12"`) into 0-based (row, column)
///
/// Returns `None` for malformed references and positions beyond the Excel grid.
pub fn parse_cell_ref(s: &str) -> Option<(u32, u32)> {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut pos = 0;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let col_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
        pos += 1;
    }
    let col = letters_to_column(&s[col_start..pos])?;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }

    let row_str = &s[pos..];
    if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let row: u32 = row_str.parse().ok()?;
    if row == 0 || row > MAX_ROWS {
        return None;
    }

    Some((row - 1, col))
}

/// Convert column letters to a 0-based index (A = 0, Z = 25, AA = 26)
fn letters_to_column(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }

    let mut col: u32 = 0;
    for c in letters.chars() {
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    let col = col - 1;
    if col >= MAX_COLS {
        return None;
    }
    Some(col)
}
