//! Topological dump of all formulas.
//!
//! Cells are ordered by depth, then by id. A cell that references no other
//! cell has depth 0; otherwise its depth is one more than the deepest cell it
//! references. Replaying a dump through `eval` in order never reads a cell
//! before it has been assigned.

use super::Spreadsheet;
use std::collections::HashMap;

impl Spreadsheet {
    /// `(cell_id, expr)` for every cell with a formula, in dependency order.
    pub fn dump(&self) -> Vec<(String, String)> {
        let depths = self.depths();
        let depth = |id: &str| depths.get(id).copied().unwrap_or(0);

        let mut cells: Vec<(&str, &str)> = self
            .cells
            .values()
            .filter(|cell| !cell.expr.is_empty())
            .map(|cell| (cell.id.as_str(), cell.expr.as_str()))
            .collect();
        cells.sort_by(|(a, _), (b, _)| depth(a).cmp(&depth(b)).then_with(|| a.cmp(b)));

        cells
            .into_iter()
            .map(|(id, expr)| (id.to_string(), expr.to_string()))
            .collect()
    }

    /// Depth of every known cell, computed with Kahn's algorithm over the
    /// reference graph. The graph is acyclic, so every cell gets a depth.
    fn depths(&self) -> HashMap<&str, usize> {
        // Number of prerequisites each cell is still waiting on.
        let mut waiting_on: HashMap<&str, usize> =
            self.cells.keys().map(|id| (id.as_str(), 0)).collect();
        for cell in self.cells.values() {
            for dependent in &cell.dependents {
                if let Some(count) = waiting_on.get_mut(dependent.as_str()) {
                    *count += 1;
                }
            }
        }

        let mut ready: Vec<&str> = waiting_on
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut depths: HashMap<&str, usize> = ready.iter().map(|id| (*id, 0)).collect();

        while let Some(id) = ready.pop() {
            let Some(cell) = self.cells.get(id) else {
                continue;
            };
            let next = depths.get(id).copied().unwrap_or(0) + 1;
            for dependent in &cell.dependents {
                let Some(count) = waiting_on.get_mut(dependent.as_str()) else {
                    continue;
                };
                let depth = depths.entry(dependent.as_str()).or_insert(0);
                *depth = (*depth).max(next);
                *count -= 1;
                if *count == 0 {
                    ready.push(dependent.as_str());
                }
            }
        }
        depths
    }
}
