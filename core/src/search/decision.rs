use crate::domain::{IntCst, IntVar};
use crate::error::PropagResult;
use crate::solver::Solver;

/// A user-supplied decision kind with no built-in representation.
pub trait CustomDecision {
    fn apply(&self, solver: &mut Solver) -> PropagResult<()>;
    fn refute(&self, solver: &mut Solver) -> PropagResult<()>;
    fn describe(&self) -> String;
}

/// A pair `(apply, refute)` acting on the solver (`spec.md` §3, §4.4).
///
/// Closed set named in `spec.md` §9's redesign flag (`AssignValue`,
/// `SplitDomain`, `SequenceRank`) plus a `Custom` escape hatch for
/// user-defined branching.
pub enum Decision {
    /// `apply: x = v`, `refute: x != v`.
    AssignValue { var: IntVar, value: IntCst },
    /// `apply: x <= pivot`, `refute: x > pivot`.
    SplitDomain { var: IntVar, pivot: IntCst },
    /// Ranking decision for a sequencing variable, named in `spec.md` §9 to
    /// round out the closed set even without a reference constraint
    /// emitting it; semantics mirror `AssignValue` over a rank-position
    /// variable rather than a value-domain variable.
    SequenceRank { var: IntVar, value: IntCst },
    Custom(Box<dyn CustomDecision>),
}

impl Decision {
    pub fn apply(&self, solver: &mut Solver) -> PropagResult<()> {
        match self {
            Decision::AssignValue { var, value } => {
                solver.set_value(*var, *value)?;
                Ok(())
            }
            Decision::SplitDomain { var, pivot } => {
                solver.set_max(*var, *pivot)?;
                Ok(())
            }
            Decision::SequenceRank { var, value } => {
                solver.set_value(*var, *value)?;
                Ok(())
            }
            Decision::Custom(c) => c.apply(solver),
        }
    }

    pub fn refute(&self, solver: &mut Solver) -> PropagResult<()> {
        match self {
            Decision::AssignValue { var, value } => {
                solver.remove_value(*var, *value)?;
                Ok(())
            }
            Decision::SplitDomain { var, pivot } => {
                solver.set_min(*var, *pivot + 1)?;
                Ok(())
            }
            Decision::SequenceRank { var, value } => {
                solver.remove_value(*var, *value)?;
                Ok(())
            }
            Decision::Custom(c) => c.refute(solver),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Decision::AssignValue { var, value } => format!("{var:?} = {value}"),
            Decision::SplitDomain { var, pivot } => format!("{var:?} <= {pivot}"),
            Decision::SequenceRank { var, value } => format!("rank({var:?}) = {value}"),
            Decision::Custom(c) => c.describe(),
        }
    }
}
