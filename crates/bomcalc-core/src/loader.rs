//! Sheet loading: pick a normalization rule per sheet name and build a dataset

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::table::{Dataset, RawSheets};

/// How to normalize one sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRule {
    /// Row holding the column labels (0-based)
    pub header_row: usize,
    /// First data row (0-based, after `header_row`)
    pub data_start: usize,
    /// Source columns to keep, in output order
    pub columns: Vec<usize>,
}

impl SheetRule {
    /// Create a new rule
    pub fn new(header_row: usize, data_start: usize, columns: Vec<usize>) -> Self {
        Self {
            header_row,
            data_start,
            columns,
        }
    }

    /// BOM Header layout: four preamble rows, columns A, B, D, H, I, J
    pub fn bom_header() -> Self {
        Self::new(3, 4, vec![0, 1, 3, 7, 8, 9])
    }

    /// BOM Item layout: labels on the first row, columns A, B, D, H, M, N, AP
    pub fn bom_item() -> Self {
        Self::new(0, 1, vec![0, 1, 3, 7, 12, 13, 41])
    }

    fn validate(&self, designator: &str) -> Result<()> {
        if self.data_start <= self.header_row {
            return Err(Error::InvalidSheetRule {
                designator: designator.to_string(),
                header_row: self.header_row,
                data_start: self.data_start,
            });
        }
        Ok(())
    }
}

/// A rule applied to sheets whose name contains `designator` (case-insensitive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignatedRule {
    /// Substring looked for in the sheet name
    pub designator: String,
    /// Rule for matching sheets
    pub rule: SheetRule,
}

/// Table of per-sheet normalization rules
///
/// Designated rules are tried in order and the first whose designator occurs
/// in the sheet name wins; sheets matching none use `default`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetRules {
    /// Rules selected by sheet-name substring
    pub designated: Vec<DesignatedRule>,
    /// Rule for every other sheet
    pub default: SheetRule,
}

impl Default for SheetRules {
    fn default() -> Self {
        Self {
            designated: vec![DesignatedRule {
                designator: "item".to_string(),
                rule: SheetRule::bom_item(),
            }],
            default: SheetRule::bom_header(),
        }
    }
}

impl SheetRules {
    /// Rules with only a default
    pub fn with_default(default: SheetRule) -> Self {
        Self {
            designated: Vec::new(),
            default,
        }
    }

    /// Add a designated rule after the existing ones
    pub fn designate<S: Into<String>>(mut self, designator: S, rule: SheetRule) -> Self {
        self.designated.push(DesignatedRule {
            designator: designator.into(),
            rule,
        });
        self
    }

    /// Select the rule for a sheet name
    pub fn rule_for(&self, sheet_name: &str) -> &SheetRule {
        let lowered = sheet_name.to_lowercase();
        self.designated
            .iter()
            .find(|d| lowered.contains(&d.designator.to_lowercase()))
            .map(|d| &d.rule)
            .unwrap_or(&self.default)
    }

    /// Check every rule's offsets
    pub fn validate(&self) -> Result<()> {
        self.default.validate("default")?;
        for d in &self.designated {
            d.rule.validate(&d.designator)?;
        }
        Ok(())
    }
}

/// Normalize every raw sheet with its rule.
///
/// The result lists sheets in the order the loader produced them. Sheets the
/// caller expects but the workbook lacks are simply not there.
pub fn load(raw_sheets: &RawSheets, rules: &SheetRules) -> Dataset {
    raw_sheets
        .iter()
        .map(|(name, rows)| {
            let rule = rules.rule_for(name);
            let table = normalize(rows, rule.header_row, rule.data_start, &rule.columns);
            tracing::debug!(
                sheet = name,
                source_rows = rows.len(),
                data_rows = table.len(),
                columns = table.width(),
                "normalized sheet"
            );
            (name.to_string(), table)
        })
        .collect()
}
