//! Color registry: the canonical list of selectable color codes

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::table::Dataset;

/// One selectable color code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Unique, non-empty code
    pub code: String,
    /// Best-effort display name (may be synthesized)
    pub display_name: String,
}

impl ColorEntry {
    /// Create a new entry
    pub fn new<C: Into<String>, N: Into<String>>(code: C, display_name: N) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }

    /// `"{code} - {display_name}"`, as shown in the color picker
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.display_name)
    }
}

/// Where codes and names live in the loaded tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Sheet holding code to name pairs
    pub header_sheet: String,
    /// Sheet holding ingredient rows
    pub item_sheet: String,
    /// Code column in the header table
    pub header_code_column: usize,
    /// Columns tried in order for the display name; first non-blank wins
    pub name_columns: Vec<usize>,
    /// Code column in the item table
    pub item_code_column: usize,
    /// Display name for codes without one; `{code}` is replaced by the code
    pub placeholder: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            header_sheet: "BOM Header".to_string(),
            item_sheet: "BOM Item".to_string(),
            header_code_column: 0,
            name_columns: vec![5, 4, 3, 2, 1],
            item_code_column: 0,
            placeholder: "Color for {code}".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Synthesized display name for a code
    pub fn placeholder_for(&self, code: &str) -> String {
        self.placeholder.replace("{code}", code)
    }
}

/// Build the registry from the header table, then add codes seen only in items.
///
/// Header entries keep header row order; item-only codes follow in first-seen
/// order. A code never appears twice. Missing sheets contribute nothing.
pub fn build_registry(dataset: &Dataset, config: &RegistryConfig) -> Vec<ColorEntry> {
    let mut entries = Vec::new();
    let mut seen: AHashSet<String> = AHashSet::new();

    match dataset.get(&config.header_sheet) {
        Some(header) => {
            for row in header.rows() {
                let Some(code) = row.get(config.header_code_column).and_then(|c| c.key()) else {
                    continue;
                };
                if !seen.insert(code.clone()) {
                    tracing::debug!(code = %code, "duplicate header code skipped");
                    continue;
                }
                let display_name = config
                    .name_columns
                    .iter()
                    .filter_map(|&col| row.get(col))
                    .find(|cell| !cell.is_blank())
                    .map(|cell| cell.to_string())
                    .unwrap_or_else(|| config.placeholder_for(&code));
                entries.push(ColorEntry { code, display_name });
            }
        }
        None => tracing::debug!(sheet = %config.header_sheet, "header sheet missing"),
    }

    let primary = entries.len();
    match dataset.get(&config.item_sheet) {
        Some(items) => {
            for row in items.rows() {
                let Some(code) = row.get(config.item_code_column).and_then(|c| c.key()) else {
                    continue;
                };
                if seen.insert(code.clone()) {
                    let display_name = config.placeholder_for(&code);
                    entries.push(ColorEntry { code, display_name });
                }
            }
        }
        None => tracing::debug!(sheet = %config.item_sheet, "item sheet missing"),
    }

    tracing::debug!(
        header_codes = primary,
        item_only_codes = entries.len() - primary,
        "built color registry"
    );
    entries
}

/// Entries whose code or display name contains `term`, ignoring case
///
/// A blank term matches everything.
pub fn filter_colors<'a>(entries: &'a [ColorEntry], term: &str) -> Vec<&'a ColorEntry> {
    let term = term.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| {
            term.is_empty()
                || e.code.to_lowercase().contains(&term)
                || e.display_name.to_lowercase().contains(&term)
        })
        .collect()
}
