//! sheetcalc_engine - Formula scanning, parsing and rendering.

pub mod engine;
