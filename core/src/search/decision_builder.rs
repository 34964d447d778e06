use crate::domain::{IntCst, IntVar};
use crate::search::decision::Decision;
use crate::solver::Solver;

/// Picks the next unbound variable to branch on, or `None` if `candidates`
/// is exhausted (every variable is already bound).
pub type VarSelector = fn(&Solver, &[IntVar]) -> Option<IntVar>;
/// Picks the value (for `Assign`) or split pivot (for `Split`) to branch on.
pub type ValSelector = fn(&Solver, IntVar) -> IntCst;

/// First variable in registration order with a non-singleton domain.
pub fn first_unbound(_solver: &Solver, candidates: &[IntVar]) -> Option<IntVar> {
    candidates.first().copied()
}

/// The variable with the smallest current domain.
pub fn smallest_domain(solver: &Solver, candidates: &[IntVar]) -> Option<IntVar> {
    candidates.iter().copied().min_by_key(|&v| solver.size(v))
}

/// The current lower bound — paired with `first_unbound`/`smallest_domain`
/// this is the "default labeling" referenced by `spec.md` §8 S1/S2.
pub fn min_value(solver: &Solver, v: IntVar) -> IntCst {
    solver.min(v)
}

/// A user-supplied decision builder with no built-in representation.
pub trait CustomDecisionBuilder {
    fn next(&mut self, solver: &Solver) -> Option<Decision>;
}

/// Produces the next [`Decision`], or `None` at a fixed point — a solution
/// at the current node (`spec.md` §4.4).
///
/// Closed set per `spec.md` §9's redesign flag (`Assign`, `Split`, `Phase`,
/// plus `Custom`); `Restore`/`Store` (checkpoint/replay a [`crate::Assignment`]
/// mid-search) are folded into `Custom` since they need no dedicated engine
/// support beyond what `Assignment` itself already exposes.
pub enum DecisionBuilder {
    /// Assigns one variable to a single value per decision.
    Assign { vars: Vec<IntVar>, var_select: VarSelector, val_select: ValSelector },
    /// Splits one variable's range in two per decision.
    Split { vars: Vec<IntVar>, var_select: VarSelector },
    /// Tries each inner builder in order; the first to produce a decision
    /// wins. A fixed point is reached only once every phase is exhausted.
    Phase(Vec<DecisionBuilder>),
    Custom(Box<dyn CustomDecisionBuilder>),
}

impl DecisionBuilder {
    pub fn next(&mut self, solver: &Solver) -> Option<Decision> {
        match self {
            DecisionBuilder::Assign { vars, var_select, val_select } => {
                let unbound: Vec<IntVar> = vars.iter().copied().filter(|&v| !solver.is_bound(v)).collect();
                let var = var_select(solver, &unbound)?;
                let value = val_select(solver, var);
                Some(Decision::AssignValue { var, value })
            }
            DecisionBuilder::Split { vars, var_select } => {
                let unbound: Vec<IntVar> = vars.iter().copied().filter(|&v| !solver.is_bound(v)).collect();
                let var = var_select(solver, &unbound)?;
                let pivot = solver.min(var) + (solver.max(var) - solver.min(var)) / 2;
                Some(Decision::SplitDomain { var, pivot })
            }
            DecisionBuilder::Phase(phases) => phases.iter_mut().find_map(|b| b.next(solver)),
            DecisionBuilder::Custom(c) => c.next(solver),
        }
    }
}
