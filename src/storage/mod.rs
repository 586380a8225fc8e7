//! Storage for formula dumps (JSON arrays of `[cellId, expr]` pairs)

mod json;

pub use json::{read_dump, write_dump};
