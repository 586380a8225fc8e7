//! sheetcalc-core - Spreadsheet model: dependency graph, evaluation and dumps.

pub mod error;
pub mod spreadsheet;

pub use error::{ErrorCode, Result, SheetError};
pub use spreadsheet::{CellInfo, CellValue, Spreadsheet, Updates};

pub use sheetcalc_engine::engine::Position;
