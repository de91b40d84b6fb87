//! Cell value types

use std::fmt;
use std::sync::Arc;

/// A single loosely-typed spreadsheet cell
///
/// `Absent` means the source had nothing at this position. It is distinct from
/// `Text("")`, which is only produced for header labels.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// No value at this position
    #[default]
    Absent,

    /// Text value
    Text(SharedString),

    /// Numeric value
    Number(f64),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),
}

impl Cell {
    /// Create a new text cell
    pub fn text<S: AsRef<str>>(s: S) -> Self {
        Cell::Text(SharedString::new(s))
    }

    /// Check if the cell is the absent sentinel
    pub fn is_absent(&self) -> bool {
        matches!(self, Cell::Absent)
    }

    /// Check if the cell is absent or only whitespace text
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Absent => true,
            Cell::Text(s) => s.as_str().trim().is_empty(),
            _ => false,
        }
    }

    /// Try to get the value as a string slice
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a number
    ///
    /// Text is read with [`parse_number`], so `"12.5 kg"` yields `12.5`.
    /// Booleans never read as numbers.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => parse_number(s.as_str()),
            _ => None,
        }
    }

    /// Read the cell as a weight, falling back to 0 when it is not a finite number
    pub fn weight(&self) -> f64 {
        match self.as_number() {
            Some(n) if n.is_finite() => n,
            _ => {
                if !self.is_blank() {
                    tracing::trace!(cell = %self, "unparsable weight, using 0");
                }
                0.0
            }
        }
    }

    /// Trimmed display text when it is not empty
    ///
    /// Used for color codes, which may be stored as text or as numbers.
    pub fn key(&self) -> Option<String> {
        if self.is_absent() {
            return None;
        }
        let text = self.to_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Get the type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Absent => "absent",
            Cell::Text(_) => "text",
            Cell::Number(_) => "number",
            Cell::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Absent => Ok(()),
            Cell::Text(s) => write!(f, "{}", s.as_str()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Boolean(b)
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::text(s)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Absent, Into::into)
    }
}

/// Parse the leading decimal number of a string.
///
/// Leading whitespace is skipped and anything after the longest numeric prefix
/// is ignored, so `"7.5kg"` is `7.5` and `"1,200"` is `1`. Returns `None` when
/// there is no numeric prefix at all.
pub fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    if s[pos..].starts_with("Infinity") {
        let sign = if bytes.first() == Some(&b'-') { -1.0 } else { 1.0 };
        return Some(sign * f64::INFINITY);
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut digits = pos - int_start;

    if bytes.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        digits += end - frac_start;
        if digits > 0 {
            pos = end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let mut end = pos + 1;
        if matches!(bytes.get(end), Some(b'+') | Some(b'-')) {
            end += 1;
        }
        let exp_start = end;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
        if end > exp_start {
            pos = end;
        }
    }

    s[..pos].trim_end_matches('.').parse::<f64>().ok()
}

/// Shared immutable string
///
/// Codes and unit labels repeat across thousands of rows; `Arc<str>` lets the
/// dataset and every derived formulation share the same allocation.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a new shared string
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    /// Get the string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the length of the string
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString::new(s)
    }
}
