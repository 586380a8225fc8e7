//! Cell reference parsing and formatting.
//!
//! Two kinds of coordinates live here:
//!
//! - [`Position`] - an absolute, in-range cell location. Its text form is the
//!   normalized cell id the spreadsheet uses as a key (`a1`, `c12`).
//! - [`CellRef`] - a reference as written inside a formula (`$a$1`, `b12`).
//!   Each coordinate is either absolute or an offset from the formula's base cell,
//!   so a formula can be rendered again relative to any other cell.
//!
//! # Examples
//!
//! ```ignore
//! let a5 = Position::parse("a5").unwrap();
//! let r = CellRef::parse("$b3", a5).unwrap();
//! assert_eq!(r.to_text(Position::parse("a7").unwrap()), "$b5");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::ParseError;

/// Number of columns: single letters `a` through `z`.
pub const MAX_COLS: usize = 26;

/// Number of rows: `1` through `999`.
pub const MAX_ROWS: usize = 999;

fn cell_ref_re() -> &'static Regex {
    static CELL_RE: OnceLock<Regex> = OnceLock::new();
    CELL_RE.get_or_init(|| {
        Regex::new(r"^(?<abs_col>\$?)(?<col>[A-Za-z])(?<abs_row>\$?)(?<row>[0-9]+)$")
            .expect("cell reference regex must compile")
    })
}

/// Split `text` into `(col_is_abs, col, row_is_abs, row)` with 0-based, in-range indices.
fn split_ref(text: &str) -> Option<(bool, usize, bool, usize)> {
    let caps = cell_ref_re().captures(text.trim())?;
    let letter = caps["col"].to_ascii_lowercase().bytes().next()?;
    let col = (letter - b'a') as usize;
    let row = caps["row"].parse::<usize>().ok()?.checked_sub(1)?;
    if row >= MAX_ROWS {
        return None;
    }
    Some((!caps["abs_col"].is_empty(), col, !caps["abs_row"].is_empty(), row))
}

/// An absolute cell location (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub fn new(col: usize, row: usize) -> Position {
        Position { col, row }
    }

    /// Build a position from signed indices, or `None` when it falls off the grid.
    pub fn checked(col: i64, row: i64) -> Option<Position> {
        let col = usize::try_from(col).ok().filter(|c| *c < MAX_COLS)?;
        let row = usize::try_from(row).ok().filter(|r| *r < MAX_ROWS)?;
        Some(Position::new(col, row))
    }

    /// Parse a cell id such as `a1`, `B12` or `$c$3`. `$` markers are ignored.
    pub fn parse(id: &str) -> Result<Position, ParseError> {
        let (_, col, _, row) =
            split_ref(id).ok_or_else(|| ParseError::BadCellRef(id.trim().to_string()))?;
        Ok(Position::new(col, row))
    }

    /// Convert a column index to its letter (0 -> a, 25 -> z).
    pub fn col_to_letter(col: usize) -> char {
        (b'a' + (col % MAX_COLS) as u8) as char
    }
}

impl std::str::FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::parse(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Position::col_to_letter(self.col), self.row + 1)
    }
}

/// One coordinate of a [`CellRef`].
///
/// For an absolute coordinate `index` is the 0-based position itself; for a
/// relative one it is the offset from the base cell.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub index: i64,
    pub is_abs: bool,
}

impl Coord {
    fn resolve(&self, base: usize) -> i64 {
        if self.is_abs {
            self.index
        } else {
            base as i64 + self.index
        }
    }
}

/// A cell reference as it appears inside a formula.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRef {
    pub col: Coord,
    pub row: Coord,
}

impl CellRef {
    /// Parse `$?LETTER$?DIGITS` relative to `base`.
    pub fn parse(text: &str, base: Position) -> Result<CellRef, ParseError> {
        let (col_abs, col, row_abs, row) =
            split_ref(text).ok_or_else(|| ParseError::BadCellRef(text.trim().to_string()))?;
        let coord = |is_abs: bool, index: usize, base: usize| Coord {
            index: if is_abs {
                index as i64
            } else {
                index as i64 - base as i64
            },
            is_abs,
        };
        Ok(CellRef {
            col: coord(col_abs, col, base.col),
            row: coord(row_abs, row, base.row),
        })
    }

    /// The cell this reference points at when its formula lives in `base`.
    pub fn resolve(&self, base: Position) -> Option<Position> {
        Position::checked(self.col.resolve(base.col), self.row.resolve(base.row))
    }

    /// Render relative to `base`. A reference that lands off the grid renders as `#REF!`.
    pub fn to_text(&self, base: Position) -> String {
        let Some(pos) = self.resolve(base) else {
            return "#REF!".to_string();
        };
        let marker = |is_abs: bool| if is_abs { "$" } else { "" };
        format!(
            "{}{}{}{}",
            marker(self.col.is_abs),
            Position::col_to_letter(pos.col),
            marker(self.row.is_abs),
            pos.row + 1
        )
    }
}
