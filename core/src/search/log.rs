use crate::search::decision::Decision;
use crate::search::monitor::SearchMonitor;
use crate::solver::Solver;

/// Traces search milestones via `tracing::debug!`/`trace!` rather than
/// `println!`.
#[derive(Default)]
pub struct LoggingMonitor {
    fails: u64,
    solutions: u64,
}

impl LoggingMonitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SearchMonitor for LoggingMonitor {
    fn enter_search(&mut self, solver: &Solver) {
        tracing::debug!(depth = solver.depth(), "search started");
    }

    fn exit_search(&mut self, solver: &Solver) {
        tracing::debug!(fails = self.fails, solutions = self.solutions, depth = solver.depth(), "search ended");
    }

    fn at_solution(&mut self, solver: &Solver) {
        self.solutions += 1;
        tracing::debug!(n = self.solutions, depth = solver.depth(), "solution found");
    }

    fn begin_fail(&mut self, solver: &Solver) {
        self.fails += 1;
        tracing::trace!(n = self.fails, depth = solver.depth(), "fail");
    }

    fn apply_decision(&mut self, _solver: &Solver, decision: &Decision) {
        tracing::trace!(decision = %decision.describe(), "apply");
    }

    fn restart_current_search(&mut self, _solver: &Solver) {
        tracing::debug!("search restarted");
    }
}
