use crate::search::decision::Decision;
use crate::solver::Solver;

/// An observer attached to the search (`spec.md` §4.4).
///
/// Every hook has a no-op default so a monitor only needs to implement the
/// events it cares about. Monitors run in registration order at each event
/// (`spec.md` §5).
pub trait SearchMonitor {
    fn enter_search(&mut self, _solver: &Solver) {}
    fn exit_search(&mut self, _solver: &Solver) {}
    fn begin_initial_propagation(&mut self, _solver: &Solver) {}
    fn end_initial_propagation(&mut self, _solver: &Solver) {}
    fn at_solution(&mut self, _solver: &Solver) {}
    fn begin_fail(&mut self, _solver: &Solver) {}
    fn apply_decision(&mut self, _solver: &Solver, _decision: &Decision) {}
    fn refute_decision(&mut self, _solver: &Solver, _decision: &Decision) {}
    fn restart_current_search(&mut self, _solver: &Solver) {}

    /// Polled at decision boundaries and between propagation rounds, never
    /// inside a demon (`spec.md` §5 "Cancellation & timeouts"). Returning
    /// `true` ends the search with status `Limit`.
    fn should_stop(&self, _solver: &Solver) -> bool {
        false
    }

    /// Polled right after `begin_fail`. Returning `true` makes the search
    /// loop call `restart_current_search` instead of backtracking to the
    /// parent choice point (`spec.md` §4.4 "Restart & no-goods").
    fn wants_restart(&self, _solver: &Solver) -> bool {
        false
    }
}
