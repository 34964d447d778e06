use crate::domain::{IntCst, IntVar};
use crate::solver::Solver;

/// A conjunction of literals forbidden in all future branches, contributed
/// by a monitor calling `restart_current_search` (`spec.md` §4.4, §5).
pub type Nogood = Vec<(IntVar, IntCst)>;

/// Append-only within a search; restarts reset only the search tree, never
/// this store (`spec.md` §5 "Shared-resource policy").
#[derive(Default)]
pub struct NogoodStore {
    nogoods: Vec<Nogood>,
}

impl NogoodStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, nogood: Nogood) {
        self.nogoods.push(nogood);
    }

    pub fn len(&self) -> usize {
        self.nogoods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nogoods.is_empty()
    }

    /// True if the current solver state already satisfies every literal of
    /// some stored nogood — that branch must be abandoned.
    pub fn violated(&self, solver: &Solver) -> bool {
        self.nogoods.iter().any(|ng| ng.iter().all(|&(var, value)| solver.is_bound(var) && solver.min(var) == value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn detects_violation_once_bound() {
        let mut s = crate::solver::Solver::new(SolverConfig::default());
        let x = s.new_int_var(0, 1);
        let mut store = NogoodStore::new();
        store.add(vec![(x, 1)]);
        assert!(!store.violated(&s));
        s.set_value(x, 1).unwrap();
        assert!(store.violated(&s));
    }
}
