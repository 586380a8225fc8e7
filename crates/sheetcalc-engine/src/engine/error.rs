//! Errors raised while scanning or parsing formula text.

use thiserror::Error;

/// A formula (or cell id) that could not be turned into an AST.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("bad cell reference '{0}'")]
    BadCellRef(String),

    #[error("bad number '{0}'")]
    BadNumber(String),

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected token '{found}': expected {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("formula nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("unexpected '{0}' after end of expression")]
    TrailingInput(String),
}
