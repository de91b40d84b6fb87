//! Engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::formulation::FormulationParams;
use crate::loader::SheetRules;
use crate::registry::RegistryConfig;
use crate::session::{DEFAULT_PAGE_SIZE, DEFAULT_RECENT_LIMIT};

/// Options for the exported formulation text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Labels of the header line
    pub column_labels: Vec<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            column_labels: ["Code", "Unit", "Qty", "Description", "Weight (kg)", "Unit", "Type"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Everything that varies between workbook layouts
///
/// Every field has a default matching the BOM workbook layout, and a JSON
/// file only needs to name what it overrides:
///
/// ```rust
/// use bomcalc_core::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{ "formulation": { "group_size": 5 } }"#).unwrap();
/// assert_eq!(config.formulation.group_size, 5);
/// assert_eq!(config.formulation.target_mass, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sheets: SheetRules,
    pub registry: RegistryConfig,
    pub formulation: FormulationParams,
    pub export: ExportOptions,
    /// Rows per page when browsing a sheet
    pub page_size: usize,
    /// Recent colors remembered per session
    pub recent_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sheets: SheetRules::default(),
            registry: RegistryConfig::default(),
            formulation: FormulationParams::default(),
            export: ExportOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check the values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        self.sheets.validate()?;
        self.formulation.validate()?;
        if self.page_size == 0 {
            return Err(Error::config("page_size must be greater than zero"));
        }
        if self.registry.item_sheet != self.formulation.item_sheet {
            tracing::warn!(
                registry = %self.registry.item_sheet,
                formulation = %self.formulation.item_sheet,
                "registry and formulation read different item sheets"
            );
        }
        Ok(())
    }
}
