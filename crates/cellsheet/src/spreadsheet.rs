//! Spreadsheet recalculation engine
//!
//! A [`Spreadsheet`] maps cell names to [`CellContents`] and keeps a cached
//! [`CellValue`] for every non-empty cell. Setting a cell is all-or-nothing:
//! the new contents are parsed and checked for circular references against
//! a scratch view of the dependency graph, and only an acyclic edit is
//! committed. The affected cells are then re-evaluated in dependency order.
//!
//! # Example
//!
//! ```rust
//! use cellsheet::prelude::*;
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.set_contents_of_cell("A1", "90").unwrap();
//! sheet.set_contents_of_cell("B1", "=A1-2").unwrap();
//! sheet.set_contents_of_cell("C1", "=B1/4").unwrap();
//!
//! let order = sheet.set_contents_of_cell("A1", "86").unwrap();
//! assert_eq!(order, vec!["A1", "B1", "C1"]);
//! assert_eq!(sheet.cell_value("C1").unwrap(), CellValue::Number(21.0));
//!
//! let err = sheet.set_contents_of_cell("A1", "=C1").unwrap_err();
//! assert!(err.is_circular());
//! ```

use crate::contents::CellContents;
use crate::options::SpreadsheetOptions;
use crate::recalc::{recalc_order, DependentsView};
use ahash::AHashMap;
use cellsheet_core::{CellValue, Error, Result};
use cellsheet_formula::{DependencyGraph, Formula};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// A stored cell
#[derive(Debug, Clone)]
struct Cell {
    contents: CellContents,
    value: CellValue,
    /// Insertion sequence, kept across overwrites
    seq: u64,
}

/// One cell's name and raw contents, as a persistence layer would store it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRecord {
    /// Normalized cell name
    pub name: String,
    /// Raw contents; formulas carry a leading `=`
    pub contents: String,
}

/// A spreadsheet of named cells with automatic recalculation
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    options: SpreadsheetOptions,
    cells: AHashMap<String, Cell>,
    graph: DependencyGraph,
    changed: bool,
    next_seq: u64,
}

impl Default for Spreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Spreadsheet {
    /// Create an empty spreadsheet with default options
    pub fn new() -> Self {
        Self::with_options(SpreadsheetOptions::default())
    }

    /// Create an empty spreadsheet
    pub fn with_options(options: SpreadsheetOptions) -> Self {
        Self {
            options,
            cells: AHashMap::new(),
            graph: DependencyGraph::new(),
            changed: false,
            next_seq: 0,
        }
    }

    /// Create a spreadsheet from `(name, raw contents)` pairs, set in order.
    ///
    /// The first pair that fails aborts construction with its error. The
    /// returned sheet is not marked as changed.
    pub fn from_contents<I, N, R>(options: SpreadsheetOptions, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, R)>,
        N: AsRef<str>,
        R: AsRef<str>,
    {
        let mut sheet = Self::with_options(options);
        for (name, raw) in pairs {
            sheet.set_contents_of_cell(name.as_ref(), raw.as_ref())?;
        }
        sheet.changed = false;
        Ok(sheet)
    }

    /// Options this sheet was created with
    pub fn options(&self) -> &SpreadsheetOptions {
        &self.options
    }

    /// Version tag
    pub fn version(&self) -> &str {
        &self.options.version
    }

    /// Whether the sheet was modified since creation or the last
    /// [`mark_saved`](Self::mark_saved)
    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Clear the changed flag
    pub fn mark_saved(&mut self) {
        self.changed = false;
    }

    /// Number of non-empty cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether every cell is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Contents of a cell; empty text if the cell was never set
    pub fn cell_contents(&self, name: &str) -> Result<CellContents> {
        let name = self.options.policy.cell_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.contents.clone())
            .unwrap_or_default())
    }

    /// Value of a cell; empty text if the cell was never set
    pub fn cell_value(&self, name: &str) -> Result<CellValue> {
        let name = self.options.policy.cell_name(name)?;
        Ok(self
            .cells
            .get(&name)
            .map(|cell| cell.value.clone())
            .unwrap_or_default())
    }

    /// Names of all non-empty cells, in the order they were first set
    pub fn nonempty_cell_names(&self) -> Vec<String> {
        self.cells().map(|(name, _)| name.to_string()).collect()
    }

    /// Non-empty cells with their contents, in the order they were first set
    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellContents)> + '_ {
        let mut cells: Vec<(&String, &Cell)> = self.cells.iter().collect();
        cells.sort_unstable_by_key(|(_, cell)| cell.seq);
        cells
            .into_iter()
            .map(|(name, cell)| (name.as_str(), &cell.contents))
    }

    /// Snapshot of every non-empty cell as a [`CellRecord`]
    pub fn records(&self) -> Vec<CellRecord> {
        self.cells()
            .map(|(name, contents)| CellRecord {
                name: name.to_string(),
                contents: contents.to_raw_string(),
            })
            .collect()
    }

    /// Cells whose formulas reference `name` directly
    pub fn direct_dependents(&self, name: &str) -> Result<BTreeSet<String>> {
        let name = self.options.policy.cell_name(name)?;
        Ok(self.graph.dependents(&name).map(str::to_string).collect())
    }

    /// Cells that must be recalculated when all of `names` change, in the
    /// order to recalculate them
    pub fn cells_to_recalculate<I, S>(&self, names: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| self.options.policy.cell_name(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        recalc_order(&DependentsView::live(&self.graph), names.iter().map(String::as_str))
            .map_err(|cycle| Error::CircularDependency { cell: cycle.cell })
    }

    /// Set the contents of a cell.
    ///
    /// `raw` is classified as a number if it parses to a finite `f64`, as a
    /// formula if it starts with `=`, and as text otherwise. The empty string
    /// clears the cell.
    ///
    /// Returns the cell followed by every cell that transitively depends on
    /// it, in an order where each cell comes after everything it depends on.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `name` is not an acceptable cell name
    /// - [`Error::FormulaSyntax`] if a formula does not parse
    /// - [`Error::CircularDependency`] if the new contents would create a cycle
    ///
    /// On error the sheet is left exactly as it was.
    pub fn set_contents_of_cell(&mut self, name: &str, raw: &str) -> Result<Vec<String>> {
        let name = self.options.policy.cell_name(name)?;
        let contents = self.classify(raw)?;

        let dependees = match &contents {
            Some(CellContents::Formula(formula)) => formula.variables(),
            _ => BTreeSet::new(),
        };

        let view = DependentsView::replacing(&self.graph, &name, &dependees);
        let order = match recalc_order(&view, [name.as_str()]) {
            Ok(order) => order,
            Err(cycle) => {
                warn!(cell = %name, via = %cycle.cell, "rejected circular assignment");
                return Err(Error::CircularDependency { cell: name });
            }
        };

        self.graph.replace_dependees(&name, &dependees);
        let kind = contents.as_ref().map_or("empty", CellContents::type_name);
        match contents {
            Some(contents) => self.store(&name, contents),
            None => {
                self.cells.remove(&name);
            }
        }
        self.changed = true;
        self.recompute(&order);

        debug!(cell = %name, kind, affected = order.len(), "set cell contents");
        Ok(order)
    }

    /// Parse raw cell input; `None` means the cell is cleared
    fn classify(&self, raw: &str) -> Result<Option<CellContents>> {
        if raw.is_empty() {
            return Ok(None);
        }
        if let Some(n) = raw.trim().parse::<f64>().ok().filter(|n| n.is_finite()) {
            return Ok(Some(CellContents::Number(n)));
        }
        if let Some(text) = raw.strip_prefix('=') {
            let formula = Formula::with_policy(text, self.options.policy.clone())?;
            return Ok(Some(CellContents::Formula(formula)));
        }
        Ok(Some(CellContents::Text(raw.to_string())))
    }

    fn store(&mut self, name: &str, contents: CellContents) {
        let value = contents.literal_value().unwrap_or_default();
        match self.cells.get_mut(name) {
            Some(cell) => {
                cell.contents = contents;
                cell.value = value;
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.cells.insert(
                    name.to_string(),
                    Cell {
                        contents,
                        value,
                        seq,
                    },
                );
            }
        }
    }

    /// Numeric value of a cell, if it has one
    fn lookup(&self, name: &str) -> Option<f64> {
        self.cells.get(name).and_then(|cell| cell.value.as_number())
    }

    /// Re-evaluate every formula cell in `order`, which must be topological
    fn recompute(&mut self, order: &[String]) {
        for name in order {
            let value = match self.cells.get(name) {
                Some(Cell {
                    contents: CellContents::Formula(formula),
                    ..
                }) => formula.evaluate_value(|var| self.lookup(var)),
                _ => continue,
            };
            trace!(cell = %name, %value, "recomputed");
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellsheet_core::EvaluationErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify() {
        let sheet = Spreadsheet::new();
        assert_eq!(sheet.classify("").unwrap(), None);
        assert_eq!(
            sheet.classify(" 2.50 ").unwrap(),
            Some(CellContents::Number(2.5))
        );
        assert_eq!(
            sheet.classify("1e3").unwrap(),
            Some(CellContents::Number(1000.0))
        );
        assert_eq!(
            sheet.classify("inf").unwrap(),
            Some(CellContents::Text("inf".into()))
        );
        assert_eq!(
            sheet.classify("NaN").unwrap(),
            Some(CellContents::Text("NaN".into()))
        );
        assert_eq!(
            sheet.classify(" ").unwrap(),
            Some(CellContents::Text(" ".into()))
        );
        assert!(sheet.classify("=A1+1").unwrap().unwrap().is_formula());
        assert!(matches!(sheet.classify("=A1+"), Err(Error::FormulaSyntax(_))));
    }

    #[test]
    fn test_non_cell_variables_are_unresolved() {
        let mut sheet = Spreadsheet::new();
        assert_eq!(sheet.set_contents_of_cell("A1", "=x + 1").unwrap(), vec!["A1"]);
        assert_eq!(
            sheet.cell_contents("A1").unwrap(),
            CellContents::Formula(Formula::new("x+1").unwrap())
        );
        let value = sheet.cell_value("A1").unwrap();
        assert_eq!(
            value.as_error().map(|e| e.kind().clone()),
            Some(EvaluationErrorKind::UnresolvedVariable("x".into()))
        );
        assert!(sheet.classify("=_a1").unwrap().unwrap().is_formula());
    }

    #[test]
    fn test_values_follow_contents() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("A1", "3").unwrap();
        sheet.set_contents_of_cell("B1", "=A1*2").unwrap();
        assert_eq!(sheet.cell_value("B1").unwrap(), CellValue::Number(6.0));

        sheet.set_contents_of_cell("A1", "text").unwrap();
        let value = sheet.cell_value("B1").unwrap();
        assert_eq!(
            value.as_error().map(|e| e.kind().clone()),
            Some(EvaluationErrorKind::UnresolvedVariable("A1".into()))
        );

        sheet.set_contents_of_cell("A1", "4").unwrap();
        assert_eq!(sheet.cell_value("B1").unwrap(), CellValue::Number(8.0));
    }

    #[test]
    fn test_overwrite_keeps_insertion_position() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("B2", "1").unwrap();
        sheet.set_contents_of_cell("A1", "2").unwrap();
        sheet.set_contents_of_cell("B2", "hello").unwrap();
        assert_eq!(sheet.nonempty_cell_names(), vec!["B2", "A1"]);

        sheet.set_contents_of_cell("B2", "").unwrap();
        sheet.set_contents_of_cell("B2", "again").unwrap();
        assert_eq!(sheet.nonempty_cell_names(), vec!["A1", "B2"]);
    }

    #[test]
    fn test_cycle_leaves_everything_untouched() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("A1", "=B1+1").unwrap();
        sheet.mark_saved();

        let before = sheet.graph.clone();
        let err = sheet.set_contents_of_cell("B1", "=A1").unwrap_err();
        assert_eq!(err, Error::CircularDependency { cell: "B1".into() });
        assert!(!sheet.changed());
        assert_eq!(sheet.graph.len(), before.len());
        assert!(sheet.graph.contains("B1", "A1"));
        assert!(!sheet.graph.contains("A1", "B1"));
        sheet.graph.assert_consistent();
    }
}
