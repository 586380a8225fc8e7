//! Error types for the sheetcalc spreadsheet model.

use std::fmt;

use serde::Serialize;
use sheetcalc_engine::engine::ParseError;
use thiserror::Error;

/// Errors a spreadsheet operation can report. State is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("bad cell id '{0}'")]
    InvalidCellId(String),

    #[error("circular reference: {cell} refers to {via}, which depends on {cell}")]
    CircularRef { cell: String, via: String },
}

/// The two error kinds hosts see.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Syntax,
    CircularRef,
}

impl SheetError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SheetError::Syntax(_) | SheetError::InvalidCellId(_) => ErrorCode::Syntax,
            SheetError::CircularRef { .. } => ErrorCode::CircularRef,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Syntax => write!(f, "SYNTAX"),
            ErrorCode::CircularRef => write!(f, "CIRCULAR_REF"),
        }
    }
}

pub type Result<T> = std::result::Result<T, SheetError>;
