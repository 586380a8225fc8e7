//! Spreadsheet state and logic.

mod dump;
mod eval;
mod ops;
mod state;

pub use state::{CellInfo, CellValue, Spreadsheet, Updates};
