use crate::backtrack::Mark;
use crate::error::Status;
use crate::search::decision::Decision;
use crate::search::decision_builder::DecisionBuilder;
use crate::search::monitor::SearchMonitor;
use crate::search::nogood::NogoodStore;
use crate::solver::Solver;

/// A trail marker plus the decision taken there, kept around so that if
/// search later fails back to this node its refutation can still be tried
/// (`spec.md` §3 "Choice Point").
struct ChoicePoint {
    /// Marker taken *before* `decision.apply` ran.
    marker: Mark,
    decision: Decision,
}

/// A single DFS search in progress, returned by [`Solver::new_search`] and
/// driven by [`Solver::next_solution`] (`spec.md` §6 "Search API").
pub struct Search {
    db: DecisionBuilder,
    monitors: Vec<Box<dyn SearchMonitor>>,
    nogoods: NogoodStore,
    stack: Vec<ChoicePoint>,
    root_marker: Option<Mark>,
    /// Set right after `next_solution` reports a solution, so the next call
    /// knows to back off it before resuming the search.
    paused_at_solution: bool,
    done: bool,
}

impl Search {
    pub fn new(db: DecisionBuilder, monitors: Vec<Box<dyn SearchMonitor>>) -> Self {
        Search { db, monitors, nogoods: NogoodStore::new(), stack: Vec::new(), root_marker: None, paused_at_solution: false, done: false }
    }

    pub fn nogoods(&self) -> &NogoodStore {
        &self.nogoods
    }

    pub fn nogoods_mut(&mut self) -> &mut NogoodStore {
        &mut self.nogoods
    }
}

impl Solver {
    /// Begins a new search. Only one search may be active per solver at a
    /// time (`spec.md` §3 "Exactly one active search at a time per solver").
    ///
    /// # Panics
    /// Panics if another search on this solver is already active — a
    /// `Misuse`, not a `Fail` (`spec.md` §7).
    pub fn new_search(&mut self, db: DecisionBuilder, monitors: Vec<Box<dyn SearchMonitor>>) -> Search {
        assert!(!self.searching, "Solver::new_search called while another search is already active");
        self.searching = true;
        Search::new(db, monitors)
    }

    /// Advances `search` to the next solution.
    ///
    /// Returns `true` (and leaves the solver's variables bound to that
    /// solution) while solutions remain; returns `false` once the tree is
    /// exhausted or a monitor limit trips, and unwinds the solver back to
    /// how it was before [`Solver::new_search`] (`spec.md` §6).
    pub fn next_solution(&mut self, search: &mut Search) -> bool {
        if search.done {
            return false;
        }

        if search.root_marker.is_none() {
            for m in search.monitors.iter_mut() {
                m.enter_search(self);
            }
            search.root_marker = Some(self.mark());
            for m in search.monitors.iter_mut() {
                m.begin_initial_propagation(self);
            }
            let ok = self.propagate().is_ok();
            for m in search.monitors.iter_mut() {
                m.end_initial_propagation(self);
            }
            if !ok {
                return self.finish_search(search, false);
            }
        }

        if search.paused_at_solution {
            search.paused_at_solution = false;
            if !self.backtrack(search) {
                return self.finish_search(search, false);
            }
        }

        loop {
            if search.monitors.iter().any(|m| m.should_stop(self)) || search.nogoods.violated(self) {
                return self.finish_search(search, false);
            }

            match search.db.next(self) {
                None => {
                    for m in search.monitors.iter_mut() {
                        m.at_solution(self);
                    }
                    search.paused_at_solution = true;
                    return true;
                }
                Some(decision) => {
                    let marker = self.mark();
                    for m in search.monitors.iter_mut() {
                        m.apply_decision(self, &decision);
                    }
                    let applied = decision.apply(self).and_then(|_| self.propagate());
                    if applied.is_ok() {
                        search.stack.push(ChoicePoint { marker, decision });
                        continue;
                    }
                    for m in search.monitors.iter_mut() {
                        m.begin_fail(self);
                    }
                    self.restore_to(marker);
                    if search.monitors.iter().any(|m| m.should_stop(self)) {
                        return self.finish_search(search, false);
                    }
                    for m in search.monitors.iter_mut() {
                        m.refute_decision(self, &decision);
                    }
                    let refuted = decision.refute(self).and_then(|_| self.propagate());
                    if refuted.is_ok() {
                        continue;
                    }
                    for m in search.monitors.iter_mut() {
                        m.begin_fail(self);
                    }
                    self.restore_to(marker);
                    if search.monitors.iter().any(|m| m.should_stop(self)) {
                        return self.finish_search(search, false);
                    }
                    if search.monitors.iter().any(|m| m.wants_restart(self)) {
                        self.restart_current_search(search);
                        continue;
                    }
                    if !self.backtrack(search) {
                        return self.finish_search(search, false);
                    }
                }
            }
        }
    }

    /// Pops choice points, trying each one's pending refutation, until one
    /// succeeds (search resumes from there), a monitor's limit trips, or the
    /// stack is exhausted (the whole tree has been explored).
    ///
    /// Polls `should_stop` right after every fail this loop records, so a
    /// limit trips on the exact fail that reaches it rather than after the
    /// cascade has already popped further choice points past it.
    fn backtrack(&mut self, search: &mut Search) -> bool {
        while let Some(cp) = search.stack.pop() {
            self.restore_to(cp.marker);
            for m in search.monitors.iter_mut() {
                m.refute_decision(self, &cp.decision);
            }
            let refuted = cp.decision.refute(self).and_then(|_| self.propagate());
            if refuted.is_ok() {
                return true;
            }
            for m in search.monitors.iter_mut() {
                m.begin_fail(self);
            }
            self.restore_to(cp.marker);
            if search.monitors.iter().any(|m| m.should_stop(self)) {
                return false;
            }
            if search.monitors.iter().any(|m| m.wants_restart(self)) {
                self.restart_current_search(search);
                return true;
            }
        }
        false
    }

    fn finish_search(&mut self, search: &mut Search, _more: bool) -> bool {
        search.done = true;
        if let Some(root) = search.root_marker {
            self.restore_to(root);
        }
        for m in search.monitors.iter_mut() {
            m.exit_search(self);
        }
        self.searching = false;
        false
    }

    /// Ends `search` early, unwinding to the state before [`Solver::new_search`].
    pub fn end_search(&mut self, mut search: Search) {
        if !search.done {
            self.finish_search(&mut search, false);
        }
    }

    /// Unwinds the current search to its root and clears the working tree,
    /// but (per `spec.md` §5) never clears `search`'s nogood store. A
    /// monitor wanting to contribute a nogood should call
    /// `search.nogoods_mut().add(..)` before invoking this.
    pub fn restart_current_search(&mut self, search: &mut Search) {
        if let Some(root) = search.root_marker {
            self.restore_to(root);
        }
        search.stack.clear();
        search.paused_at_solution = false;
        for m in search.monitors.iter_mut() {
            m.restart_current_search(self);
        }
    }

    /// Convenience wrapper over `new_search`/`next_solution`/`end_search`
    /// for the common "find one solution" case (`spec.md` §6).
    pub fn solve(&mut self, db: DecisionBuilder, monitors: Vec<Box<dyn SearchMonitor>>) -> Status {
        let mut search = self.new_search(db, monitors);
        let found = self.next_solution(&mut search);
        let status = if found {
            Status::Feasible
        } else if search.monitors.iter().any(|m| m.should_stop(self)) {
            Status::Limit
        } else {
            Status::Infeasible
        };
        self.end_search(search);
        status
    }
}
