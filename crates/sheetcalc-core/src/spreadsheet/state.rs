use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use sheetcalc_engine::engine::{Ast, Position};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Cell id -> new value for every cell an operation recomputed.
pub type Updates = BTreeMap<String, f64>;

/// What [`Spreadsheet::query`] reports for a cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellValue {
    pub value: f64,
    pub expr: String,
}

/// Per-cell record. Created when a formula is entered or when another formula
/// first references the cell.
#[derive(Clone, Debug)]
pub struct CellInfo {
    /// Normalized id (`a1`), also the key in the cell table.
    pub id: String,
    pub position: Position,
    pub value: f64,
    /// Formula text with whitespace removed, empty when the cell has no formula.
    pub expr: String,
    pub ast: Option<Ast>,
    /// Cells whose current formula directly references this cell.
    pub dependents: BTreeSet<String>,
}

impl CellInfo {
    pub(crate) fn new(position: Position) -> CellInfo {
        CellInfo {
            id: position.to_string(),
            position,
            value: 0.0,
            expr: String::new(),
            ast: None,
            dependents: BTreeSet::new(),
        }
    }
}

/// A named spreadsheet owning every cell record.
///
/// Cells refer to each other only by id, so a record can be dropped without
/// leaving dangling links. The graph formed by `dependents` is kept acyclic:
/// formulas that would close a cycle are rejected before anything changes.
#[derive(Clone, Debug, Default)]
pub struct Spreadsheet {
    name: String,
    pub(crate) cells: HashMap<String, CellInfo>,
}

impl Spreadsheet {
    pub fn new(name: impl Into<String>) -> Spreadsheet {
        Spreadsheet {
            name: name.into(),
            cells: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a cell record by id (`A1`, `$a$1` and `a1` name the same cell).
    pub fn cell(&self, cell_id: &str) -> Option<&CellInfo> {
        let pos = Position::parse(cell_id).ok()?;
        self.cells.get(&pos.to_string())
    }

    /// Number of cell records, including empty cells that are only referenced.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Get the record at `pos`, creating an empty one if needed.
    pub(crate) fn cell_mut(&mut self, pos: Position) -> &mut CellInfo {
        self.cells
            .entry(pos.to_string())
            .or_insert_with(|| CellInfo::new(pos))
    }
}

/// Parse a cell id supplied by a caller.
pub(crate) fn resolve_id(cell_id: &str) -> Result<Position> {
    Position::parse(cell_id).map_err(|_| SheetError::InvalidCellId(cell_id.trim().to_string()))
}
