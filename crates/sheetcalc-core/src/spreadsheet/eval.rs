use super::state::{Updates, resolve_id};
use super::Spreadsheet;
use crate::error::{Result, SheetError};
use log::debug;
use sheetcalc_engine::engine::{Ast, AstVisitor, CellRef, Op, Position, parse};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Evaluates a formula, linking the formula's cell into the `dependents` of
/// every cell it reads.
struct Evaluator<'a> {
    sheet: &'a mut Spreadsheet,
    base: Position,
}

impl AstVisitor for Evaluator<'_> {
    type Output = f64;

    fn visit_num(&mut self, value: f64) -> f64 {
        value
    }

    fn visit_ref(&mut self, cell_ref: &CellRef) -> f64 {
        let Some(pos) = cell_ref.resolve(self.base) else {
            return 0.0;
        };
        let dependent = self.base.to_string();
        let target = self.sheet.cell_mut(pos);
        target.dependents.insert(dependent);
        target.value
    }

    fn visit_app(&mut self, op: Op, kids: Vec<f64>) -> f64 {
        op.apply(&kids)
    }
}

impl Spreadsheet {
    /// Set the formula of `cell_id` to `expr` and recompute it and every cell
    /// that depends on it, directly or indirectly.
    ///
    /// Returns the new value of each recomputed cell. On a syntax error or a
    /// circular reference nothing is changed.
    pub fn eval(&mut self, cell_id: &str, expr: &str) -> Result<Updates> {
        let base = resolve_id(cell_id)?;
        let ast = parse(expr, base)
            .inspect_err(|e| debug!("rejected {}={:?}: {}", base, expr, e))?;
        self.validate(base, &ast)
            .inspect_err(|e| debug!("rejected {}={:?}: {}", base, expr, e))?;

        self.unlink(base);
        let cell = self.cell_mut(base);
        cell.ast = Some(ast);
        cell.expr = expr.chars().filter(|c| !c.is_whitespace()).collect();
        debug!("{}: set formula {}", cell.id, cell.expr);

        Ok(self.recompute(base))
    }

    /// Fail with a circular reference if any cell the new formula reads
    /// already depends (transitively) on `base`, or is `base` itself.
    fn validate(&self, base: Position, ast: &Ast) -> Result<()> {
        let prereqs: HashSet<String> = ast
            .references(base)
            .iter()
            .map(Position::to_string)
            .collect();
        let id = base.to_string();

        let mut pending = vec![id.clone()];
        let mut seen = HashSet::new();
        while let Some(current) = pending.pop() {
            if prereqs.contains(&current) {
                return Err(SheetError::CircularRef { cell: id, via: current });
            }
            if !seen.insert(current.clone()) {
                continue;
            }
            if let Some(cell) = self.cells.get(&current) {
                pending.extend(cell.dependents.iter().cloned());
            }
        }
        Ok(())
    }

    /// Remove `pos` from the `dependents` of every cell its current formula reads.
    pub(crate) fn unlink(&mut self, pos: Position) {
        let id = pos.to_string();
        let refs = match self.cells.get(&id).and_then(|cell| cell.ast.as_ref()) {
            Some(ast) => ast.references(pos),
            None => return,
        };
        for target in refs {
            if let Some(cell) = self.cells.get_mut(&target.to_string()) {
                cell.dependents.remove(&id);
            }
        }
    }

    /// Recompute `start` and all of its transitive dependents, each exactly once
    /// and only after the affected cells it reads.
    fn recompute(&mut self, start: Position) -> Updates {
        let order = self.cascade_order(&start.to_string());
        debug!("{}: cascading to {} cell(s)", start, order.len().saturating_sub(1));

        let mut updates = Updates::new();
        for id in order {
            let value = self.evaluate_cell(&id);
            updates.insert(id, value);
        }
        updates
    }

    /// Topological order of `start` and everything reachable through `dependents`.
    fn cascade_order(&self, start: &str) -> Vec<String> {
        let mut affected = BTreeSet::new();
        let mut pending = vec![start.to_string()];
        while let Some(id) = pending.pop() {
            if affected.contains(&id) {
                continue;
            }
            if let Some(cell) = self.cells.get(&id) {
                pending.extend(cell.dependents.iter().cloned());
            }
            affected.insert(id);
        }

        let mut waiting_on: BTreeMap<&str, usize> =
            affected.iter().map(|id| (id.as_str(), 0)).collect();
        for id in &affected {
            for dependent in self.dependents_of(id) {
                if let Some(count) = waiting_on.get_mut(dependent.as_str()) {
                    *count += 1;
                }
            }
        }

        let mut ready: BTreeSet<&str> = waiting_on
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(affected.len());
        while let Some(id) = ready.pop_first() {
            order.push(id.to_string());
            for dependent in self.dependents_of(id) {
                if let Some(count) = waiting_on.get_mut(dependent.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent.as_str());
                    }
                }
            }
        }
        order
    }

    fn dependents_of(&self, id: &str) -> impl Iterator<Item = &String> {
        self.cells.get(id).into_iter().flat_map(|cell| cell.dependents.iter())
    }

    /// Evaluate the stored formula of `id` and cache the result.
    fn evaluate_cell(&mut self, id: &str) -> f64 {
        let Some(cell) = self.cells.get(id) else {
            return 0.0;
        };
        let base = cell.position;
        let value = match cell.ast.clone() {
            Some(ast) => ast.fold(&mut Evaluator { sheet: self, base }),
            None => 0.0,
        };
        if let Some(cell) = self.cells.get_mut(id) {
            cell.value = value;
        }
        value
    }
}
