//! Prelude module - common imports for bomcalc users
//!
//! ```rust
//! use bomcalc::prelude::*;
//! ```

pub use crate::{
    // Cell and table types
    Cell,
    // Registry
    ColorEntry,
    Dataset,
    // Engine
    Engine,
    EngineConfig,

    // Error types
    Error,
    // Formulation types
    Formulation,
    FormulationLine,
    FormulationParams,
    FormulationSet,
    FormulationWriter,

    Page,
    RawSheets,

    Result,
    Row,
    Session,
    SheetRule,
    SheetRules,
    Table,
};

pub use crate::open_workbook;
