use crate::domain::{DomainEvent, IntVar};
use crate::error::PropagResult;
use crate::propagation::{Constraint, ConstraintId, Priority};
use crate::solver::Solver;

/// `x == y`, example constraint named in `spec.md` §6.
///
/// Maintained by intersecting the two domains on every domain change; the
/// propagation engine's own re-enqueueing on `DomainEvent::Domain` carries
/// this to a fixed point, it does not need to loop internally.
pub struct Equality {
    x: IntVar,
    y: IntVar,
}

impl Equality {
    pub fn new(x: IntVar, y: IntVar) -> Self {
        Equality { x, y }
    }
}

impl Constraint for Equality {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        let demon = solver.register_demon(id, 0, Priority::Normal, "equality");
        solver.watch(self.x, DomainEvent::Domain, demon);
        solver.watch(self.y, DomainEvent::Domain, demon);
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        let xs: Vec<_> = solver.iter_domain(self.x).collect();
        let ys: Vec<_> = solver.iter_domain(self.y).collect();
        solver.set_values(self.y, &xs)?;
        solver.set_values(self.x, &ys)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "equality"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn intersects_domains() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(0, 5);
        let y = s.new_int_var(3, 9);
        s.post(Equality::new(x, y)).unwrap();
        assert_eq!((s.min(x), s.max(x)), (3, 5));
        assert_eq!((s.min(y), s.max(y)), (3, 5));
    }
}
