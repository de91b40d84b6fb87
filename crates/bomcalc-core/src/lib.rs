//! # bomcalc-core
//!
//! Core data model and formulation engine of bomcalc.
//!
//! This crate turns the raw cell grid of a BOM workbook into typed tables and
//! derives the per-color formulations:
//! - [`Cell`], [`Table`], [`Dataset`] - the loaded data
//! - [`normalize`] and [`load`] - raw sheets to tables, driven by [`SheetRules`]
//! - [`build_registry`] - the canonical list of [`ColorEntry`] values
//! - [`build_formulations`] - groups of ingredient rows rescaled to a target mass
//! - [`Session`] - per-user browsing state
//!
//! Everything here is synchronous and pure; malformed cells degrade to a
//! fallback value instead of failing.
//!
//! ## Example
//!
//! ```rust
//! use bomcalc_core::{build_formulations, load, Cell, FormulationParams, RawSheets, SheetRule, SheetRules};
//!
//! let raw = RawSheets::new().with_sheet(
//!     "BOM Item",
//!     vec![
//!         vec![Cell::text("Code"), Cell::text("Weight")],
//!         vec![Cell::text("C1"), Cell::Number(3.0)],
//!         vec![Cell::text("C1"), Cell::Number(1.0)],
//!     ],
//! );
//! let rules = SheetRules::with_default(SheetRule::new(0, 1, vec![0, 1]));
//! let dataset = load(&raw, &rules);
//!
//! let mut params = FormulationParams::default();
//! params.columns.weight = 1;
//! let set = build_formulations(&dataset, "C1", &params);
//! assert_eq!(set.formulations[0].lines[0].weight_text, "75.000");
//! ```

pub mod cell;
pub mod config;
pub mod error;
pub mod formulation;
pub mod loader;
pub mod normalize;
pub mod registry;
pub mod session;
pub mod table;

// Re-exports for convenience
pub use cell::{parse_number, Cell, SharedString};
pub use config::{EngineConfig, ExportOptions};
pub use error::{Error, Result};
pub use formulation::{
    build_formulations, ColumnMap, Formulation, FormulationIndex, FormulationLine,
    FormulationParams, FormulationSet, IngredientRow, NegativeWeightPolicy,
};
pub use loader::{load, DesignatedRule, SheetRule, SheetRules};
pub use normalize::normalize;
pub use registry::{build_registry, filter_colors, ColorEntry, RegistryConfig};
pub use session::{filter_rows, paginate, Page, Session, DEFAULT_PAGE_SIZE, DEFAULT_RECENT_LIMIT};
pub use table::{Dataset, RawSheets, Row, Table};
