//! Formula engine API.
//!
//! This module turns formula text into something a spreadsheet can evaluate:
//!
//! - [`Position`], [`CellRef`], [`Coord`] - Cell ids and formula references (`$a$1`, `b12`)
//! - [`scan`] - Tokenize formula text relative to a base cell
//! - [`parse`] - Recursive-descent parser producing an [`Ast`]
//! - [`Ast`], [`AstVisitor`] - Immutable expression tree and its shared walk
//! - [`format_number`] - Format values and numeric literals for display

mod ast;
mod cell_ref;
mod error;
mod format;
mod parser;
mod scan;

pub use ast::{Ast, AstVisitor, Op};
pub use cell_ref::{CellRef, Coord, MAX_COLS, MAX_ROWS, Position};
pub use error::ParseError;
pub use format::format_number;
pub use parser::{MAX_DEPTH, parse};
pub use scan::{Token, TokenKind, scan};
