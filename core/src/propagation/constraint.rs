use crate::create_ref_type;
use crate::error::PropagResult;
use crate::solver::Solver;

create_ref_type!(ConstraintId);

/// A constraint posted into a [`Solver`] (`spec.md` §3, §4.3).
///
/// A constraint is free to register any number of demons against its
/// argument variables during [`Constraint::post`]; each demon is later
/// dispatched through [`Constraint::run_demon`], distinguished by the
/// `local_id` the constraint chose when registering it. This is the single
/// dynamically-dispatched seam the kernel needs — everything else (the
/// demon record itself, its priority, its queue slot) is plain arena data,
/// per the "deep inheritance collapses to composition" redesign flag.
pub trait Constraint {
    /// Registers this constraint's demons and performs whatever one-time
    /// setup it needs. Called exactly once, right after the constraint is
    /// posted. Must NOT assume the model is already at a fixed point.
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()>;

    /// Propagates the constraint to a fixed point from scratch, ignoring
    /// which variables changed. Called once, right after `post`, before the
    /// solver's own fixed-point loop takes over via demons.
    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()>;

    /// Runs the rule identified by `local_id` (as chosen by this constraint
    /// when it registered the corresponding demon in `post`).
    fn run_demon(&mut self, local_id: u32, solver: &mut Solver) -> PropagResult<()>;

    /// A short, human-readable name used for demon/monitor attribution.
    fn name(&self) -> &'static str;
}
