//! Dependency tracking for formula calculation
//!
//! An edge `(s, t)` means "`t` depends on `s`": `s` must be evaluated before
//! `t`. Edges are kept in two mirrored indexes so both directions can be
//! queried in constant time.

use ahash::{AHashMap, AHashSet};

/// Directed dependency graph over cell names.
///
/// Names with no edges are simply absent; queries on them return empty
/// results. Empty adjacency sets are never stored.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Cell → cells that depend on it
    dependents: AHashMap<String, AHashSet<String>>,
    /// Cell → cells it depends on
    dependees: AHashMap<String, AHashSet<String>>,
    /// Number of edges
    size: usize,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of edges in the graph
    pub fn len(&self) -> usize {
        self.size
    }

    /// Whether the graph has no edges
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of cells that `s` depends on
    pub fn dependee_count(&self, s: &str) -> usize {
        self.dependees.get(s).map_or(0, |set| set.len())
    }

    /// Whether any cell depends on `s`
    pub fn has_dependents(&self, s: &str) -> bool {
        self.dependents.contains_key(s)
    }

    /// Whether `s` depends on any cell
    pub fn has_dependees(&self, s: &str) -> bool {
        self.dependees.contains_key(s)
    }

    /// Cells that depend on `s`
    pub fn dependents<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependents
            .get(s)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Cells that `s` depends on
    pub fn dependees<'a>(&'a self, s: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.dependees
            .get(s)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Whether the edge `(s, t)` exists
    pub fn contains(&self, s: &str, t: &str) -> bool {
        self.dependents.get(s).map_or(false, |set| set.contains(t))
    }

    /// Add the edge `(s, t)`: `t` depends on `s`. No-op if present.
    pub fn add_dependency(&mut self, s: &str, t: &str) {
        let inserted = self
            .dependents
            .entry(s.to_string())
            .or_default()
            .insert(t.to_string());
        if inserted {
            self.dependees
                .entry(t.to_string())
                .or_default()
                .insert(s.to_string());
            self.size += 1;
        }
    }

    /// Remove the edge `(s, t)`. No-op if absent.
    pub fn remove_dependency(&mut self, s: &str, t: &str) {
        if !Self::unlink(&mut self.dependents, s, t) {
            return;
        }
        Self::unlink(&mut self.dependees, t, s);
        self.size -= 1;
    }

    /// Replace every edge `(s, *)` with `(s, t)` for each `t` in `new_dependents`
    pub fn replace_dependents<I, S>(&mut self, s: &str, new_dependents: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(old) = self.dependents.remove(s) {
            for t in old.iter() {
                Self::unlink(&mut self.dependees, t, s);
            }
            self.size -= old.len();
        }
        for t in new_dependents {
            self.add_dependency(s, t.as_ref());
        }
    }

    /// Replace every edge `(*, t)` with `(s, t)` for each `s` in `new_dependees`.
    ///
    /// This is how a cell declares the full set of cells its formula now
    /// references.
    pub fn replace_dependees<I, S>(&mut self, t: &str, new_dependees: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(old) = self.dependees.remove(t) {
            for s in old.iter() {
                Self::unlink(&mut self.dependents, s, t);
            }
            self.size -= old.len();
        }
        for s in new_dependees {
            self.add_dependency(s.as_ref(), t);
        }
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.dependees.clear();
        self.size = 0;
    }

    /// Remove `to` from `index[from]`, dropping the set once empty.
    /// Returns whether anything was removed.
    fn unlink(index: &mut AHashMap<String, AHashSet<String>>, from: &str, to: &str) -> bool {
        let Some(set) = index.get_mut(from) else {
            return false;
        };
        let removed = set.remove(to);
        if set.is_empty() {
            index.remove(from);
        }
        removed
    }

    /// Check all invariants. Panics if any are violated.
    #[doc(hidden)]
    pub fn assert_consistent(&self) {
        let forward: usize = self.dependents.values().map(|set| set.len()).sum();
        let backward: usize = self.dependees.values().map(|set| set.len()).sum();
        assert_eq!(forward, self.size, "dependents index disagrees with size");
        assert_eq!(backward, self.size, "dependees index disagrees with size");

        for (s, targets) in self.dependents.iter() {
            assert!(!targets.is_empty(), "empty dependents set stored for {s}");
            for t in targets.iter() {
                assert!(
                    self.dependees.get(t).map_or(false, |set| set.contains(s)),
                    "missing dependee edge: {t} should list {s}"
                );
            }
        }
        for (t, sources) in self.dependees.iter() {
            assert!(!sources.is_empty(), "empty dependees set stored for {t}");
            for s in sources.iter() {
                assert!(
                    self.dependents.get(s).map_or(false, |set| set.contains(t)),
                    "missing dependent edge: {s} should list {t}"
                );
            }
        }
    }
}
