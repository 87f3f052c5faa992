//! Recalculation ordering and cycle detection
//!
//! Orders cells so that every cell comes after all the cells it depends on,
//! failing if the dependents relation reachable from the start cells
//! contains a cycle. The walk uses an explicit stack, so long dependency
//! chains cannot overflow the call stack.
//!
//! The walk runs over a [`DependentsView`], which can present the live graph
//! with one cell's dependees swapped out. Cycle checks for a proposed edit
//! therefore never touch the live graph.

use ahash::AHashMap;
use cellsheet_formula::DependencyGraph;
use std::collections::BTreeSet;

/// A cycle found while ordering; `cell` was reached while still in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cycle {
    pub cell: String,
}

/// The dependents relation of a graph, optionally with one cell's dependees
/// replaced.
pub(crate) struct DependentsView<'a> {
    graph: &'a DependencyGraph,
    replaced: Option<(&'a str, &'a BTreeSet<String>)>,
}

impl<'a> DependentsView<'a> {
    /// The graph as it is
    pub fn live(graph: &'a DependencyGraph) -> Self {
        Self {
            graph,
            replaced: None,
        }
    }

    /// The graph as it would be after `replace_dependees(cell, dependees)`
    pub fn replacing(
        graph: &'a DependencyGraph,
        cell: &'a str,
        dependees: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            graph,
            replaced: Some((cell, dependees)),
        }
    }

    /// Direct dependents of `cell`, sorted for a stable walk
    fn dependents(&self, cell: &str) -> Vec<String> {
        let mut out: Vec<String> = match self.replaced {
            Some((target, dependees)) => {
                let mut out: Vec<String> = self
                    .graph
                    .dependents(cell)
                    .filter(|d| *d != target)
                    .map(str::to_string)
                    .collect();
                if dependees.contains(cell) {
                    out.push(target.to_string());
                }
                out
            }
            None => self.graph.dependents(cell).map(str::to_string).collect(),
        };
        out.sort_unstable();
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Frame {
    cell: String,
    dependents: Vec<String>,
    next: usize,
}

/// Cells reachable from `starts` through the dependents relation, in
/// topological order.
///
/// With a single start cell the result begins with that cell. Start cells
/// reached from an earlier start are not repeated.
pub(crate) fn recalc_order<'s, I>(view: &DependentsView<'_>, starts: I) -> Result<Vec<String>, Cycle>
where
    I: IntoIterator<Item = &'s str>,
{
    let mut marks: AHashMap<String, Mark> = AHashMap::new();
    let mut finished: Vec<String> = Vec::new();

    for start in starts {
        if marks.contains_key(start) {
            continue;
        }

        marks.insert(start.to_string(), Mark::InProgress);
        let mut stack = vec![Frame {
            cell: start.to_string(),
            dependents: view.dependents(start),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.dependents.len() {
                let next = frame.dependents[frame.next].clone();
                frame.next += 1;

                match marks.get(next.as_str()) {
                    Some(Mark::InProgress) => return Err(Cycle { cell: next }),
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(next.clone(), Mark::InProgress);
                        let dependents = view.dependents(&next);
                        stack.push(Frame {
                            cell: next,
                            dependents,
                            next: 0,
                        });
                    }
                }
            } else if let Some(done) = stack.pop() {
                marks.insert(done.cell.clone(), Mark::Done);
                finished.push(done.cell);
            }
        }
    }

    finished.reverse();
    Ok(finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chain(graph: &mut DependencyGraph, cells: &[&str]) {
        for pair in cells.windows(2) {
            graph.add_dependency(pair[0], pair[1]);
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_isolated_cell() {
        let graph = DependencyGraph::new();
        let order = recalc_order(&DependentsView::live(&graph), ["A1"]).unwrap();
        assert_eq!(order, vec!["A1"]);
    }

    #[test]
    fn test_chain_order() {
        let mut graph = DependencyGraph::new();
        chain(&mut graph, &["A1", "B1", "C1"]);
        let order = recalc_order(&DependentsView::live(&graph), ["A1"]).unwrap();
        assert_eq!(order, vec!["A1", "B1", "C1"]);
    }

    #[test]
    fn test_diamond_order() {
        // A1 feeds B1 and C1, both feed D1; D1 also reads A1 directly
        let mut graph = DependencyGraph::new();
        graph.add_dependency("A1", "B1");
        graph.add_dependency("A1", "C1");
        graph.add_dependency("B1", "D1");
        graph.add_dependency("C1", "D1");
        graph.add_dependency("A1", "D1");

        let order = recalc_order(&DependentsView::live(&graph), ["A1"]).unwrap();
        let pos = |c: &str| order.iter().position(|o| o == c).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(pos("A1"), 0);
        assert!(pos("B1") < pos("D1"));
        assert!(pos("C1") < pos("D1"));
    }

    #[test]
    fn test_multiple_starts_are_merged() {
        let mut graph = DependencyGraph::new();
        chain(&mut graph, &["A1", "B1", "C1"]);
        graph.add_dependency("X1", "C1");

        let order = recalc_order(&DependentsView::live(&graph), ["B1", "A1", "X1"]).unwrap();
        let pos = |c: &str| order.iter().position(|o| o == c).unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos("A1") < pos("B1"));
        assert!(pos("B1") < pos("C1"));
        assert!(pos("X1") < pos("C1"));
    }

    #[test]
    fn test_cycle_in_live_graph() {
        let mut graph = DependencyGraph::new();
        chain(&mut graph, &["A1", "B1", "C1", "A1"]);
        assert!(recalc_order(&DependentsView::live(&graph), ["B1"]).is_err());
    }

    #[test]
    fn test_replacing_detects_self_reference() {
        let graph = DependencyGraph::new();
        let deps = set(&["A1"]);
        let view = DependentsView::replacing(&graph, "A1", &deps);
        assert_eq!(
            recalc_order(&view, ["A1"]).unwrap_err(),
            Cycle { cell: "A1".into() }
        );
    }

    #[test]
    fn test_replacing_detects_new_cycle() {
        // B1 = A1, C1 = B1; proposing A1 = C1 closes the loop
        let mut graph = DependencyGraph::new();
        chain(&mut graph, &["A1", "B1", "C1"]);
        let deps = set(&["C1"]);
        let view = DependentsView::replacing(&graph, "A1", &deps);
        assert!(recalc_order(&view, ["A1"]).is_err());
        // the live graph is untouched
        assert!(!graph.has_dependees("A1"));
    }

    #[test]
    fn test_replacing_removes_old_edges() {
        // B1 = A1 today; proposing B1 = 5 means A1 no longer feeds B1
        let mut graph = DependencyGraph::new();
        graph.add_dependency("A1", "B1");
        let deps = BTreeSet::new();
        let view = DependentsView::replacing(&graph, "B1", &deps);
        assert_eq!(recalc_order(&view, ["A1"]).unwrap(), vec!["A1"]);
    }

    #[test]
    fn test_replacing_breaks_existing_cycle_path() {
        // C1 = B1, B1 = A1; re-pointing B1 at D1 lets A1 = C1 stand
        let mut graph = DependencyGraph::new();
        chain(&mut graph, &["A1", "B1", "C1"]);
        graph.add_dependency("C1", "A1");
        let deps = set(&["D1"]);
        let view = DependentsView::replacing(&graph, "B1", &deps);
        assert_eq!(recalc_order(&view, ["B1"]).unwrap(), vec!["B1", "C1", "A1"]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut graph = DependencyGraph::new();
        let names: Vec<String> = (1..=100_000).map(|i| format!("A{i}")).collect();
        for pair in names.windows(2) {
            graph.add_dependency(&pair[0], &pair[1]);
        }
        let order = recalc_order(&DependentsView::live(&graph), ["A1"]).unwrap();
        assert_eq!(order.len(), 100_000);
        assert_eq!(order.first().map(String::as_str), Some("A1"));
        assert_eq!(order.last().map(String::as_str), Some("A100000"));
    }
}
