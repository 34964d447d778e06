use crate::search::monitor::SearchMonitor;
use crate::search::tunables::{RESTART_GROWTH_FACTOR, RESTART_INITIAL_FAILS};
use crate::solver::Solver;

/// A geometric restart policy (`spec.md` §4.4 "Restart & no-goods"): counts
/// fails since the last restart and asks the search loop to restart once
/// the threshold is hit, then grows the threshold for next time.
///
/// Contributes no nogoods on its own — a caller wanting conflict-directed
/// restarts should record one via `Search::nogoods_mut()` before the restart
/// the next `wants_restart` call triggers.
pub struct RestartMonitor {
    fails_since_restart: u64,
    threshold: u64,
    restarts: u64,
}

impl Default for RestartMonitor {
    fn default() -> Self {
        RestartMonitor { fails_since_restart: 0, threshold: RESTART_INITIAL_FAILS.get(), restarts: 0 }
    }
}

impl RestartMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }
}

impl SearchMonitor for RestartMonitor {
    fn begin_fail(&mut self, _solver: &Solver) {
        self.fails_since_restart += 1;
    }

    fn wants_restart(&self, _solver: &Solver) -> bool {
        self.fails_since_restart >= self.threshold
    }

    fn restart_current_search(&mut self, _solver: &Solver) {
        self.fails_since_restart = 0;
        self.threshold = self.threshold.saturating_mul(RESTART_GROWTH_FACTOR.get() as u64).max(1);
        self.restarts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn trips_after_threshold_then_grows() {
        let mut m = RestartMonitor::new();
        let threshold = m.threshold;
        let s = Solver::new(SolverConfig::default());
        for _ in 0..threshold {
            m.begin_fail(&s);
        }
        assert!(m.wants_restart(&s));
        m.restart_current_search(&s);
        assert!(!m.wants_restart(&s));
        assert_eq!(m.threshold, threshold * 2);
    }
}
