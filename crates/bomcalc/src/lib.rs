//! # bomcalc
//!
//! Bill-of-materials formulation calculator.
//!
//! Loads a BOM workbook (XLSX, or a single CSV sheet), normalizes its sheets,
//! builds the color registry and derives, for every color code, the
//! formulations rescaled to a target mass.
//!
//! ## Features
//!
//! - Read XLSX/XLSM workbooks (`xlsx` feature, on by default)
//! - Read CSV files as a one-sheet workbook
//! - Layout rules, name fallbacks, group size and target mass from configuration
//! - Formulation export as CSV text or tab-separated clipboard text
//!
//! ## Example
//!
//! ```rust
//! use bomcalc::prelude::*;
//!
//! let raw = RawSheets::new().with_sheet(
//!     "BOM Item",
//!     vec![
//!         vec![Cell::text("Code"), Cell::text("Unit"), Cell::text("Qty"), Cell::text("Description"),
//!              Cell::text("Weight"), Cell::text("Unit"), Cell::text("Type")],
//!         vec![Cell::text("C1"), Cell::text("UM03"), Cell::Number(1.0), Cell::text("Red"),
//!              Cell::Number(3.0), Cell::text("KG"), Cell::text("RM02")],
//!         vec![Cell::text("C1"), Cell::text("UM03"), Cell::Number(1.0), Cell::text("White"),
//!              Cell::Number(1.0), Cell::text("KG"), Cell::text("RM02")],
//!     ],
//! );
//!
//! let mut config = EngineConfig::default();
//! config.sheets = SheetRules::with_default(SheetRule::new(0, 1, (0..7).collect()));
//!
//! let engine = Engine::new(&raw, config).unwrap();
//! let set = engine.formulations("C1");
//! assert_eq!(set.formulations[0].lines[0].weight_text, "75.000");
//! ```

mod error;
pub mod prelude;

use std::path::Path;
use std::sync::Arc;

pub use error::{Error, LoadError, Result};

// Re-export core types
pub use bomcalc_core::{
    build_formulations, build_registry, filter_colors, filter_rows, load, normalize, paginate,
    parse_number, Cell, ColorEntry, ColumnMap, Dataset, DesignatedRule, EngineConfig,
    ExportOptions, Formulation, FormulationIndex, FormulationLine, FormulationParams,
    FormulationSet, IngredientRow, NegativeWeightPolicy, Page, RawSheets, RegistryConfig, Row,
    Session, SharedString, SheetRule, SheetRules, Table, DEFAULT_PAGE_SIZE,
    DEFAULT_RECENT_LIMIT,
};

// Re-export I/O types
pub use bomcalc_csv::{export_file_name, CsvError, CsvReadOptions, CsvSheetReader, FormulationWriter};
#[cfg(feature = "xlsx")]
pub use bomcalc_xlsx::{XlsxError, XlsxReader};

/// Read a workbook file into raw sheets, picking the reader from the extension
///
/// `.xlsx` and `.xlsm` go through the XLSX reader; `.csv` becomes a single
/// sheet named after the file stem.
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<RawSheets> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    let loaded = match extension.as_deref() {
        #[cfg(feature = "xlsx")]
        Some("xlsx") | Some("xlsm") => XlsxReader::read_file(path).map_err(LoadError::from),
        Some("csv") => {
            CsvSheetReader::read_file(path, &CsvReadOptions::default()).map_err(LoadError::from)
        }
        other => Err(LoadError::UnsupportedFormat(
            other.unwrap_or("no extension").to_string(),
        )),
    };

    loaded.map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })
}

/// A loaded workbook with its registry and formulations computed up front
///
/// The dataset is immutable and shared behind an [`Arc`]; an engine can be
/// cloned cheaply and handed to other threads. Lookups never fail: unknown
/// codes and missing sheets produce empty results.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Arc<EngineConfig>,
    dataset: Arc<Dataset>,
    registry: Arc<Vec<ColorEntry>>,
    index: Arc<FormulationIndex>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::empty(EngineConfig::default())
    }
}

impl Engine {
    /// Normalize raw sheets and precompute the registry and formulations
    pub fn new(raw: &RawSheets, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let dataset = load(raw, &config.sheets);
        Ok(Self::with_dataset(dataset, config))
    }

    /// Engine over an already normalized dataset
    ///
    /// The configuration is trusted as given; invalid formulation parameters
    /// yield empty formulation sets.
    pub fn with_dataset(dataset: Dataset, config: EngineConfig) -> Self {
        let registry = build_registry(&dataset, &config.registry);
        let index = FormulationIndex::build(&dataset, &registry, &config.formulation);

        tracing::info!(
            sheets = dataset.len(),
            colors = registry.len(),
            formulated = index.len(),
            "workbook loaded"
        );

        Self {
            config: Arc::new(config),
            dataset: Arc::new(dataset),
            registry: Arc::new(registry),
            index: Arc::new(index),
        }
    }

    /// Engine with no data; every lookup returns an empty result
    pub fn empty(config: EngineConfig) -> Self {
        Self {
            config: Arc::new(config),
            dataset: Arc::new(Dataset::new()),
            registry: Arc::new(Vec::new()),
            index: Arc::new(FormulationIndex::default()),
        }
    }

    /// Open a workbook file and build the engine
    pub fn open<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening workbook");
        let raw = open_workbook(path)?;
        Self::new(&raw, config)
    }

    /// The active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The normalized tables
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Shared handle to the normalized tables
    pub fn shared_dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    /// One normalized table by sheet name
    pub fn table(&self, sheet: &str) -> Option<&Table> {
        self.dataset.get(sheet)
    }

    /// Every color code, in registry order
    pub fn colors(&self) -> &[ColorEntry] {
        &self.registry
    }

    /// Colors whose code or name contains `term`, case-insensitively
    pub fn search_colors(&self, term: &str) -> Vec<&ColorEntry> {
        filter_colors(&self.registry, term)
    }

    /// Registry entry of a code
    pub fn color(&self, code: &str) -> Option<&ColorEntry> {
        let code = code.trim();
        self.registry.iter().find(|e| e.code == code)
    }

    /// Formulations of a color code, empty when the code has no ingredient rows
    pub fn formulations(&self, code: &str) -> FormulationSet {
        self.index.lookup(code)
    }

    /// CSV export text of a color code's formulations
    pub fn export_csv(&self, code: &str) -> Result<String> {
        let set = self.formulations(code);
        FormulationWriter::serialize(&set, &self.config.export.column_labels).map_err(Error::Export)
    }

    /// Write the CSV export of a color code to a file
    pub fn export_csv_file<P: AsRef<Path>>(&self, code: &str, path: P) -> Result<()> {
        let set = self.formulations(code);
        FormulationWriter::write_file(&set, &self.config.export.column_labels, path)
            .map_err(Error::Export)
    }

    /// Tab-separated text of a color code's formulation rows
    pub fn clipboard_text(&self, code: &str) -> String {
        FormulationWriter::clipboard_text(&self.formulations(code))
    }

    /// A fresh session, browsing the first sheet
    pub fn session(&self) -> Session {
        let mut session = Session::new(self.config.recent_limit);
        if let Some(first) = self.dataset.sheet_names().next() {
            session.switch_sheet(first);
        }
        session
    }

    /// The page of the session's active sheet, after its row filter
    ///
    /// `None` when the session browses no sheet or one the dataset lacks.
    pub fn view<'a>(&'a self, session: &Session) -> Option<Page<'a>> {
        let table = self.dataset.get(session.active_sheet.as_deref()?)?;
        Some(session.view(table, self.config.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_engine_is_shareable() {
        assert_send_sync::<Engine>();
    }

    #[test]
    fn test_empty_engine() {
        let engine = Engine::default();
        assert!(engine.dataset().is_empty());
        assert!(engine.colors().is_empty());
        assert!(engine.formulations("C100").is_empty());
        assert_eq!(engine.clipboard_text("C100"), "");
        assert!(engine.view(&engine.session()).is_none());
        assert_eq!(
            engine.export_csv("C100").unwrap(),
            "Code,Unit,Qty,Description,Weight (kg),Unit,Type\n"
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = open_workbook("colors.ods").unwrap_err();
        assert!(err.is_load_failure());
        assert!(matches!(
            err,
            Error::Load { source: LoadError::UnsupportedFormat(ref ext), .. } if ext == "ods"
        ));

        let err = open_workbook("README").unwrap_err();
        assert!(err.to_string().contains("no extension"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.formulation.group_size = 0;
        assert!(matches!(
            Engine::new(&RawSheets::new(), config),
            Err(Error::Config(bomcalc_core::Error::ZeroGroupSize))
        ));
    }
}
