use super::state::{CellValue, Updates, resolve_id};
use super::Spreadsheet;
use crate::error::Result;
use log::debug;
use sheetcalc_engine::engine::Position;

impl Spreadsheet {
    /// Current value and formula of a cell; `{ value: 0, expr: "" }` when the
    /// cell is empty, unknown or not a valid id.
    pub fn query(&self, cell_id: &str) -> CellValue {
        let Ok(pos) = Position::parse(cell_id) else {
            return CellValue::default();
        };
        self.cells
            .get(&pos.to_string())
            .map(|cell| CellValue {
                value: cell.value,
                expr: cell.expr.clone(),
            })
            .unwrap_or_default()
    }

    /// Drop a cell and recompute the cells that referenced it, which now read 0.
    /// Removing an unknown cell changes nothing.
    pub fn remove(&mut self, cell_id: &str) -> Result<Updates> {
        let pos = resolve_id(cell_id)?;
        let mut updates = Updates::new();
        if !self.cells.contains_key(&pos.to_string()) {
            return Ok(updates);
        }

        self.unlink(pos);
        let Some(removed) = self.cells.remove(&pos.to_string()) else {
            return Ok(updates);
        };
        debug!("{}: removed, {} dependent(s)", pos, removed.dependents.len());

        for dependent in removed.dependents {
            let expr = match self.cells.get(&dependent) {
                Some(cell) if !cell.expr.is_empty() => cell.expr.clone(),
                _ => continue,
            };
            updates.extend(self.eval(&dependent, &expr)?);
        }
        Ok(updates)
    }

    /// Copy the formula of `src_id` into `dest_id`, shifting relative references
    /// by the distance between the two cells. Copying an empty cell removes `dest_id`.
    pub fn copy(&mut self, dest_id: &str, src_id: &str) -> Result<Updates> {
        let dest = resolve_id(dest_id)?;
        let src = resolve_id(src_id)?;
        let text = self
            .cells
            .get(&src.to_string())
            .filter(|cell| !cell.expr.is_empty())
            .and_then(|cell| cell.ast.as_ref())
            .map(|ast| ast.to_text(dest));
        let Some(text) = text else {
            return self.remove(dest_id);
        };
        debug!("copy {} -> {}: {}", src, dest, text);
        self.eval(dest_id, &text)
    }

    /// Forget every cell. No cascade, no undo.
    pub fn clear(&mut self) {
        debug!("{}: cleared {} cell(s)", self.name(), self.cells.len());
        self.cells.clear();
    }

    /// Replay `(cell_id, expr)` pairs through [`Spreadsheet::eval`] in order,
    /// stopping at the first failure. Existing cells are kept; call
    /// [`Spreadsheet::clear`] first for a full reload.
    pub fn load<I, C, E>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (C, E)>,
        C: AsRef<str>,
        E: AsRef<str>,
    {
        let mut count = 0usize;
        for (cell_id, expr) in pairs {
            self.eval(cell_id.as_ref(), expr.as_ref())?;
            count += 1;
        }
        debug!("{}: loaded {} formula(s)", self.name(), count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{CellValue, ErrorCode, Spreadsheet, Updates};
    use pretty_assertions::assert_eq;

    fn updates(pairs: &[(&str, f64)]) -> Updates {
        pairs.iter().map(|(id, v)| (id.to_string(), *v)).collect()
    }

    #[test]
    fn test_query_empty_cell() {
        let sheet = Spreadsheet::new("test");
        assert_eq!(sheet.query("a1"), CellValue::default());
        assert_eq!(sheet.query("not a cell"), CellValue::default());
    }

    #[test]
    fn test_query_normalizes_id() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("b2", "1 + 1").unwrap();
        assert_eq!(
            sheet.query("$B$2"),
            CellValue {
                value: 2.0,
                expr: "1+1".to_string()
            }
        );
    }

    #[test]
    fn test_remove_unknown_cell_is_noop() {
        let mut sheet = Spreadsheet::new("test");
        assert_eq!(sheet.remove("c3").unwrap(), Updates::new());
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_remove_recomputes_dependents() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a1", "22").unwrap();
        sheet.eval("a2", "a1 * 2").unwrap();
        sheet.eval("a3", "a2 + 1").unwrap();
        assert_eq!(
            sheet.remove("a1").unwrap(),
            updates(&[("a2", 0.0), ("a3", 1.0)])
        );
        assert_eq!(sheet.query("a1"), CellValue::default());
        // a2 still reads a1, so the empty record is back as a link target.
        assert!(sheet.cell("a1").unwrap().dependents.contains("a2"));
    }

    #[test]
    fn test_remove_unlinks_own_references() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a1", "5").unwrap();
        sheet.eval("b1", "a1").unwrap();
        sheet.remove("b1").unwrap();
        assert!(sheet.cell("a1").unwrap().dependents.is_empty());
        assert_eq!(sheet.eval("a1", "6").unwrap(), updates(&[("a1", 6.0)]));
    }

    #[test]
    fn test_copy_shifts_relative_refs() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("f2", "(c2 + d2) * e2").unwrap();
        sheet.copy("h4", "f2").unwrap();
        assert_eq!(sheet.query("h4").expr, "(e4+f4)*g4");
    }

    #[test]
    fn test_copy_keeps_absolute_refs() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a1", "10").unwrap();
        sheet.eval("b2", "$a$1 + a$1 + $a1").unwrap();
        assert_eq!(sheet.copy("c4", "b2").unwrap(), updates(&[("c4", 10.0)]));
        assert_eq!(sheet.query("c4").expr, "$a$1+b$1+$a3");
    }

    #[test]
    fn test_copy_empty_source_removes_dest() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a1", "3").unwrap();
        sheet.eval("b1", "a1 + 1").unwrap();
        assert_eq!(sheet.copy("a1", "z9").unwrap(), updates(&[("b1", 1.0)]));
        assert_eq!(sheet.query("a1").expr, "");
    }

    #[test]
    fn test_copy_into_cycle_is_rejected() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a2", "a1 + 1").unwrap();
        sheet.eval("b1", "b2 * 2").unwrap();
        // Rebased to a1, b1's formula reads a2, which already reads a1.
        let err = sheet.copy("a1", "b1").unwrap_err();
        assert_eq!(err.code(), ErrorCode::CircularRef);
        assert_eq!(sheet.query("a1"), CellValue::default());
    }

    #[test]
    fn test_copy_off_grid_is_syntax_error() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a2", "a1 + 1").unwrap();
        let err = sheet.copy("a1", "a2").unwrap_err();
        assert_eq!(err.code(), ErrorCode::Syntax);
        assert_eq!(sheet.query("a1"), CellValue::default());
    }

    #[test]
    fn test_copy_overflowing_literal() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a1", "1e999 - 1").unwrap();
        assert_eq!(sheet.copy("b1", "a1").unwrap(), updates(&[("b1", f64::INFINITY)]));
        assert_eq!(sheet.query("b1").expr, "1e999-1");
    }

    #[test]
    fn test_clear() {
        let mut sheet = Spreadsheet::new("test");
        sheet.eval("a1", "1").unwrap();
        sheet.eval("a2", "a1").unwrap();
        sheet.clear();
        assert!(sheet.is_empty());
        assert_eq!(sheet.query("a2"), CellValue::default());
    }

    #[test]
    fn test_load_replays_in_order() {
        let mut sheet = Spreadsheet::new("test");
        sheet
            .load([("a1", "22"), ("b1", "3"), ("a3", "a1*b1"), ("a2", "a1+a3")])
            .unwrap();
        assert_eq!(sheet.query("a2").value, 88.0);
    }

    #[test]
    fn test_load_stops_at_first_error() {
        let mut sheet = Spreadsheet::new("test");
        let err = sheet
            .load(vec![
                ("a1".to_string(), "1".to_string()),
                ("a2".to_string(), "a2".to_string()),
                ("a3".to_string(), "2".to_string()),
            ])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CircularRef);
        assert_eq!(sheet.query("a1").value, 1.0);
        assert_eq!(sheet.query("a3"), CellValue::default());
    }
}
