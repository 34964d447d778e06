use crate::domain::{DomainEvent, IntVar};
use crate::error::PropagResult;
use crate::propagation::{Constraint, ConstraintId, Priority};
use crate::solver::Solver;

/// `x != y`, example constraint named in `spec.md` §6.
///
/// Value-consistency only: whichever side is bound has its value removed
/// from the other. Sound but not domain-complete — a pair of wide domains
/// that happen to be disjoint is not detected until one side narrows to a
/// point, which is acceptable since the search eventually binds both.
pub struct Difference {
    x: IntVar,
    y: IntVar,
}

impl Difference {
    pub fn new(x: IntVar, y: IntVar) -> Self {
        Difference { x, y }
    }
}

impl Constraint for Difference {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        let demon = solver.register_demon(id, 0, Priority::Normal, "difference");
        solver.watch(self.x, DomainEvent::Value, demon);
        solver.watch(self.y, DomainEvent::Value, demon);
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        if solver.is_bound(self.x) {
            solver.remove_value(self.y, solver.min(self.x))?;
        }
        if solver.is_bound(self.y) {
            solver.remove_value(self.x, solver.min(self.y))?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "difference"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn bound_side_prunes_the_other() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(1, 1);
        let y = s.new_int_var(1, 2);
        s.post(Difference::new(x, y)).unwrap();
        assert_eq!(s.min(y), 2);
        assert_eq!(s.max(y), 2);
    }
}
