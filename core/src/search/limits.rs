use std::time::{Duration, Instant};

use crate::search::decision::Decision;
use crate::search::monitor::SearchMonitor;
use crate::solver::Solver;

/// Composite limit monitor: wall-time, branch count, fail count, and
/// solution count, each with a monotonic cutoff check (`spec.md` §4.4).
pub struct Limits {
    max_wall_time: Option<Duration>,
    max_branches: Option<u64>,
    max_fails: Option<u64>,
    max_solutions: Option<u64>,
    started_at: Option<Instant>,
    branches: u64,
    fails: u64,
    solutions: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_wall_time: None,
            max_branches: None,
            max_fails: None,
            max_solutions: None,
            started_at: None,
            branches: 0,
            fails: 0,
            solutions: 0,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_wall_time(mut self, d: Duration) -> Self {
        self.max_wall_time = Some(d);
        self
    }
    pub fn with_max_branches(mut self, n: u64) -> Self {
        self.max_branches = Some(n);
        self
    }
    pub fn with_max_fails(mut self, n: u64) -> Self {
        self.max_fails = Some(n);
        self
    }
    pub fn with_max_solutions(mut self, n: u64) -> Self {
        self.max_solutions = Some(n);
        self
    }

    pub fn fails(&self) -> u64 {
        self.fails
    }
    pub fn branches(&self) -> u64 {
        self.branches
    }
    pub fn solutions(&self) -> u64 {
        self.solutions
    }
}

impl SearchMonitor for Limits {
    fn enter_search(&mut self, _solver: &Solver) {
        self.started_at = Some(Instant::now());
    }

    fn begin_fail(&mut self, _solver: &Solver) {
        self.fails += 1;
    }

    fn apply_decision(&mut self, _solver: &Solver, _decision: &Decision) {
        self.branches += 1;
    }

    fn at_solution(&mut self, _solver: &Solver) {
        self.solutions += 1;
    }

    fn should_stop(&self, _solver: &Solver) -> bool {
        if matches!(self.max_fails, Some(m) if self.fails >= m) {
            return true;
        }
        if matches!(self.max_branches, Some(m) if self.branches >= m) {
            return true;
        }
        if matches!(self.max_solutions, Some(m) if self.solutions >= m) {
            return true;
        }
        if let (Some(budget), Some(start)) = (self.max_wall_time, self.started_at) {
            if start.elapsed() >= budget {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_max_fails() {
        let mut limits = Limits::new().with_max_fails(3);
        let solver = crate::solver::Solver::new(crate::solver::SolverConfig::default());
        limits.enter_search(&solver);
        for _ in 0..3 {
            limits.begin_fail(&solver);
        }
        assert!(limits.should_stop(&solver));
    }
}
