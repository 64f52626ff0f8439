//! Dependency graph between cells.
//!
//! # Edge Direction
//!
//! ```text
//! (s, t)  means  "t's formula references s"
//! ```
//!
//! `s` is a *dependee* of `t` and `t` is a *dependent* of `s`. Following
//! dependents answers "what must be recomputed when s changes?".

use std::collections::{HashMap, HashSet};

use super::cell_name::CellName;

/// A set of (dependee, dependent) pairs with adjacency in both directions.
///
/// Invariants:
/// - `dependents[s]` contains `t` iff `dependees[t]` contains `s`.
/// - Empty adjacency sets are removed, so a cell with no edges is absent.
/// - `len` is the number of distinct pairs.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    dependents: HashMap<CellName, HashSet<CellName>>,
    dependees: HashMap<CellName, HashSet<CellName>>,
    len: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (dependee, dependent) pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cells whose formulas reference `s`.
    pub fn dependents<'a>(&'a self, s: &CellName) -> impl Iterator<Item = &'a CellName> + use<'a> {
        self.dependents.get(s).into_iter().flatten()
    }

    /// Cells referenced by `t`'s formula.
    pub fn dependees<'a>(&'a self, t: &CellName) -> impl Iterator<Item = &'a CellName> + use<'a> {
        self.dependees.get(t).into_iter().flatten()
    }

    pub fn has_dependents(&self, s: &CellName) -> bool {
        self.dependents.contains_key(s)
    }

    pub fn has_dependees(&self, t: &CellName) -> bool {
        self.dependees.contains_key(t)
    }

    /// Number of cells referenced by `t`'s formula.
    pub fn dependee_count(&self, t: &CellName) -> usize {
        self.dependees.get(t).map_or(0, HashSet::len)
    }

    /// Record that `t` references `s`. No-op if already recorded.
    pub fn add_dependency(&mut self, s: &CellName, t: &CellName) {
        let inserted = self
            .dependents
            .entry(s.clone())
            .or_default()
            .insert(t.clone());
        if inserted {
            self.dependees.entry(t.clone()).or_default().insert(s.clone());
            self.len += 1;
        }
    }

    /// Forget that `t` references `s`. No-op if not recorded.
    pub fn remove_dependency(&mut self, s: &CellName, t: &CellName) {
        let removed = match self.dependents.get_mut(s) {
            Some(set) => set.remove(t),
            None => false,
        };
        if !removed {
            return;
        }
        prune(&mut self.dependents, s);
        if let Some(set) = self.dependees.get_mut(t) {
            set.remove(s);
        }
        prune(&mut self.dependees, t);
        self.len -= 1;
    }

    /// Replace every (s, _) pair with (s, t) for each t in `new_dependents`.
    /// Returns the previous dependents of `s`.
    pub fn replace_dependents<I>(&mut self, s: &CellName, new_dependents: I) -> HashSet<CellName>
    where
        I: IntoIterator<Item = CellName>,
    {
        let old = self.dependents.get(s).cloned().unwrap_or_default();
        for t in &old {
            self.remove_dependency(s, t);
        }
        for t in new_dependents {
            self.add_dependency(s, &t);
        }
        old
    }

    /// Replace every (_, t) pair with (s, t) for each s in `new_dependees`.
    /// Returns the previous dependees of `t`.
    pub fn replace_dependees<I>(&mut self, t: &CellName, new_dependees: I) -> HashSet<CellName>
    where
        I: IntoIterator<Item = CellName>,
    {
        let old = self.dependees.get(t).cloned().unwrap_or_default();
        for s in &old {
            self.remove_dependency(s, t);
        }
        for s in new_dependees {
            self.add_dependency(&s, t);
        }
        old
    }
}

fn prune(map: &mut HashMap<CellName, HashSet<CellName>>, key: &CellName) {
    if map.get(key).is_some_and(HashSet::is_empty) {
        map.remove(key);
    }
}
