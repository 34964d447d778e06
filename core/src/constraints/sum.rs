use crate::domain::{DomainEvent, IntCst, IntVar};
use crate::error::PropagResult;
use crate::propagation::{Constraint, ConstraintId, Priority};
use crate::solver::Solver;

fn bounds(solver: &Solver, vars: &[IntVar]) -> (IntCst, IntCst) {
    let min = vars.iter().map(|&v| solver.min(v)).sum();
    let max = vars.iter().map(|&v| solver.max(v)).sum();
    (min, max)
}

/// `sum(vars) <= bound`, example constraint named in `spec.md` §6.
pub struct SumWithBound {
    vars: Vec<IntVar>,
    bound: IntCst,
}

impl SumWithBound {
    pub fn new(vars: Vec<IntVar>, bound: IntCst) -> Self {
        SumWithBound { vars, bound }
    }
}

impl Constraint for SumWithBound {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        let demon = solver.register_demon(id, 0, Priority::Normal, "sum_with_bound");
        for &v in &self.vars {
            solver.watch(v, DomainEvent::Range, demon);
        }
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        let (sum_min, _) = bounds(solver, &self.vars);
        for &v in &self.vars {
            let others_min = sum_min - solver.min(v);
            let slack = self.bound - others_min;
            solver.set_max(v, slack)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sum_with_bound"
    }
}

/// `result == sum(vars)`, used internally to materialize a [`crate::domain::expr`]
/// sum node, and available directly as a building block.
pub struct SumEquals {
    vars: Vec<IntVar>,
    result: IntVar,
}

impl SumEquals {
    pub fn new(vars: Vec<IntVar>, result: IntVar) -> Self {
        SumEquals { vars, result }
    }
}

impl Constraint for SumEquals {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        let demon = solver.register_demon(id, 0, Priority::Normal, "sum_equals");
        for &v in &self.vars {
            solver.watch(v, DomainEvent::Range, demon);
        }
        solver.watch(self.result, DomainEvent::Range, demon);
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        let (sum_min, sum_max) = bounds(solver, &self.vars);
        solver.set_min(self.result, sum_min)?;
        solver.set_max(self.result, sum_max)?;

        let (res_min, res_max) = (solver.min(self.result), solver.max(self.result));
        for &v in &self.vars {
            let others_min: IntCst = self.vars.iter().filter(|&&o| o != v).map(|&o| solver.min(o)).sum();
            let others_max: IntCst = self.vars.iter().filter(|&&o| o != v).map(|&o| solver.max(o)).sum();
            solver.set_min(v, res_min - others_max)?;
            solver.set_max(v, res_max - others_min)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sum_equals"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn sum_with_bound_tightens_max() {
        let mut s = Solver::new(SolverConfig::default());
        let a = s.new_int_var(0, 10);
        let b = s.new_int_var(5, 10);
        s.post(SumWithBound::new(vec![a, b], 12)).unwrap();
        assert_eq!(s.max(a), 7);
        assert_eq!(s.max(b), 10);
    }

    #[test]
    fn sum_equals_propagates_both_ways() {
        let mut s = Solver::new(SolverConfig::default());
        let a = s.new_int_var(1, 3);
        let b = s.new_int_var(1, 3);
        let r = s.new_int_var(0, 100);
        s.post(SumEquals::new(vec![a, b], r)).unwrap();
        assert_eq!((s.min(r), s.max(r)), (2, 6));
        s.set_value(a, 3).unwrap();
        assert_eq!((s.min(r), s.max(r)), (4, 6));
    }
}
