use crate::domain::{DomainEvent, IntCst, IntVar};
use crate::error::PropagResult;
use crate::propagation::{Constraint, ConstraintId, Priority};
use crate::solver::Solver;

/// `result == table[index]`, example constraint named in `spec.md` §6.
///
/// `index`'s domain is expected to stay within `0..table.len()`; values
/// outside that range are simply never considered reachable.
pub struct Element {
    index: IntVar,
    table: Vec<IntCst>,
    result: IntVar,
}

impl Element {
    pub fn new(index: IntVar, table: Vec<IntCst>, result: IntVar) -> Self {
        Element { index, table, result }
    }
}

impl Constraint for Element {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        let demon = solver.register_demon(id, 0, Priority::Normal, "element");
        solver.watch(self.index, DomainEvent::Domain, demon);
        solver.watch(self.result, DomainEvent::Domain, demon);
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        let reachable: Vec<IntCst> = solver
            .iter_domain(self.index)
            .filter_map(|i| self.table.get(i as usize).copied())
            .collect();
        solver.set_values(self.result, &reachable)?;

        let allowed_indices: Vec<IntCst> = solver
            .iter_domain(self.index)
            .filter(|&i| matches!(self.table.get(i as usize), Some(&val) if solver.contains(self.result, val)))
            .collect();
        solver.set_values(self.index, &allowed_indices)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "element"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn restricts_result_and_index() {
        let mut s = Solver::new(SolverConfig::default());
        let index = s.new_int_var(0, 3);
        let result = s.new_int_var(0, 100);
        s.post(Element::new(index, vec![10, 20, 30, 40], result)).unwrap();
        assert_eq!(s.iter_domain(result).collect::<Vec<_>>(), vec![10, 20, 30, 40]);
        s.set_range(result, 15, 25).unwrap();
        s.propagate().unwrap();
        assert_eq!(s.iter_domain(index).collect::<Vec<_>>(), vec![1]);
    }
}
