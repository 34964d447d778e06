use crate::domain::{DomainEvent, IntVar};
use crate::error::PropagResult;
use crate::propagation::{inconsistent, Constraint, ConstraintId, Priority};
use crate::solver::Solver;

/// `all_different(vars)`, example constraint named in `spec.md` §6.
///
/// Forward-checking strength: whenever a variable becomes bound, its value
/// is removed from every other argument. Sound (S1's 6 permutations are
/// exactly the accepted solutions) but not the full Régin bounds-consistent
/// algorithm, which is out of scope here.
pub struct AllDifferent {
    vars: Vec<IntVar>,
}

impl AllDifferent {
    pub fn new(vars: Vec<IntVar>) -> Self {
        AllDifferent { vars }
    }
}

impl Constraint for AllDifferent {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        let demon = solver.register_demon(id, 0, Priority::Normal, "all_different");
        for &v in &self.vars {
            solver.watch(v, DomainEvent::Value, demon);
        }
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        let bound_values: Vec<_> = self.vars.iter().filter(|&&v| solver.is_bound(v)).map(|&v| (v, solver.min(v))).collect();
        for (i, &(bv, val)) in bound_values.iter().enumerate() {
            for &(bv2, val2) in &bound_values[i + 1..] {
                if val == val2 {
                    let _ = (bv, bv2);
                    return Err(inconsistent("all_different"));
                }
            }
        }
        for &v in &self.vars {
            if solver.is_bound(v) {
                continue;
            }
            for &(bound_var, val) in &bound_values {
                if bound_var != v {
                    solver.remove_value(v, val)?;
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "all_different"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn binds_force_removal() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(1, 3);
        let y = s.new_int_var(1, 1);
        let z = s.new_int_var(1, 3);
        s.post(AllDifferent::new(vec![x, y, z])).unwrap();
        assert!(!s.contains(x, 1));
        assert!(!s.contains(z, 1));
    }
}
