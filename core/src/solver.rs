//! The `Solver`: owns every piece of reversible state plus the propagation
//! queue and constraint arena, and ties them together (`spec.md` §3).

use std::any::Any;
use std::marker::PhantomData;

use crate::backtrack::{Mark, Trail};
use crate::collections::ref_store::RefVec;
use crate::domain::expr::ExprStore;
use crate::domain::int_var::IntVarData;
use crate::domain::interval_var::IntervalVarData;
use crate::domain::{IntVar, IntervalVar};
use crate::propagation::{Constraint, ConstraintId, DemonId, DemonRecord, PropQueue};

/// Tunable, non-reversible solver parameters (`SPEC_FULL.md` §2.3).
///
/// Search-policy constants that are better tuned without recompiling (restart
/// geometry, nogood budget) are `env_param` statics declared next to the
/// search module that uses them, not fields here — this struct only holds
/// what a caller plausibly wants to set per-`Solver` instance.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Hint for how many undo closures to pre-allocate the trail's log for.
    pub trail_capacity_hint: usize,
    /// Default branch-count-independent depth limit applied to `solve()`
    /// unless a search monitor overrides it. `None` means unlimited.
    pub default_depth_limit: Option<u32>,
    /// Whether `Delayed` demons scheduled by a `Normal` demon's own run are
    /// allowed to run before the current `propagate()` call returns, or are
    /// deferred to the next one.
    pub coalesce_delayed_across_propagation: bool,
    /// Seed for any constraint that needs to break ties deterministically.
    pub tie_break_seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            trail_capacity_hint: 1024,
            default_depth_limit: None,
            coalesce_delayed_across_propagation: true,
            tie_break_seed: 0,
        }
    }
}

/// Everything a choice point rewinds: variables, intervals, and the
/// reversible-object arena backing [`Solver::rev_alloc`].
///
/// Kept as a field sibling to `Solver::trail` (rather than folded into
/// `Solver` itself) so that `trail.restore_to(marker, &mut state)` never
/// needs a second mutable borrow of `Solver` — see `backtrack::Trail`'s docs.
#[derive(Default)]
pub(crate) struct ReversibleState {
    pub(crate) vars: RefVec<IntVar, IntVarData>,
    pub(crate) intervals: RefVec<IntervalVar, IntervalVarData>,
    pub(crate) rev_arena: Vec<Box<dyn Any>>,
}

/// A handle to a value allocated via [`Solver::rev_alloc`].
///
/// Carries no lifetime: like [`IntVar`]/[`ConstraintId`], it is only ever
/// meaningful against the `Solver` that produced it.
pub struct RevRef<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for RevRef<T> {}
impl<T> Clone for RevRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

/// The constraint-programming kernel: reversible state, propagation queue,
/// and (once `search.rs` is reached) the search tree driving `solve()`.
pub struct Solver {
    pub(crate) config: SolverConfig,
    pub(crate) trail: Trail<ReversibleState>,
    pub(crate) state: ReversibleState,
    pub(crate) demons: RefVec<DemonId, DemonRecord>,
    pub(crate) constraints: RefVec<ConstraintId, Box<dyn Constraint>>,
    pub(crate) queue: PropQueue,
    pub(crate) exprs: ExprStore,
    /// Set for the duration of `solve()`; guards against a reentrant call
    /// on the same solver (a `Misuse`, not a `Fail`, per `spec.md` §7).
    pub(crate) searching: bool,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        tracing::debug!(trail_capacity_hint = config.trail_capacity_hint, "constructing solver");
        Solver {
            config,
            trail: Trail::new(),
            state: ReversibleState::default(),
            demons: RefVec::new(),
            constraints: RefVec::new(),
            queue: PropQueue::default(),
            exprs: ExprStore::default(),
            searching: false,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Number of currently open choice points.
    pub fn depth(&self) -> u32 {
        self.trail.depth()
    }

    /// Opens a new reversible segment (`spec.md` §4.1).
    pub fn mark(&mut self) -> Mark {
        self.trail.mark()
    }

    /// Rewinds every mutation recorded since `marker`.
    ///
    /// Takes `self.trail` out of `self` for the duration of the call so that
    /// `Trail::restore_to` can take `&mut self.state` without a second
    /// mutable borrow of `self` — see `backtrack::Trail`'s docs for why the
    /// reversible arena lives on `ReversibleState` rather than on `Trail`
    /// itself.
    ///
    /// The propagation queue is not part of the reversible log: it is
    /// discarded outright, the same way a constraint failure discards it in
    /// [`Solver::propagate`] (`spec.md` §4.3 fail semantics).
    pub fn restore_to(&mut self, marker: Mark) {
        let mut trail = std::mem::take(&mut self.trail);
        trail.restore_to(marker, &mut self.state);
        self.trail = trail;
        self.queue.clear();
        tracing::trace!(depth = self.trail.depth(), "restored to marker");
    }

    /// Allocates a reversible opaque value: future mutations recorded via
    /// [`Solver::rev_set`] are undone on [`Solver::restore_to`], and the slot
    /// itself is reclaimed once every segment that outlives the allocation
    /// is unwound (`SPEC_FULL.md` §4.1).
    pub fn rev_alloc<T: Any>(&mut self, value: T) -> RevRef<T> {
        let index = self.state.rev_arena.len();
        self.state.rev_arena.push(Box::new(value));
        self.trail.save(move |state| {
            state.rev_arena.truncate(index);
        });
        RevRef { index, _marker: PhantomData }
    }

    pub fn rev_get<T: Any>(&self, r: RevRef<T>) -> &T {
        self.state.rev_arena[r.index]
            .downcast_ref::<T>()
            .expect("RevRef used against the wrong Solver or the wrong type")
    }

    pub fn rev_set<T: Any + Clone>(&mut self, r: RevRef<T>, value: T) {
        let index = r.index;
        let previous = self.rev_get(r).clone();
        self.trail.save(move |state| {
            state.rev_arena[index] = Box::new(previous);
        });
        self.state.rev_arena[index] = Box::new(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rev_alloc_round_trip() {
        let mut s = Solver::new(SolverConfig::default());
        let marker = s.mark();
        let counter = s.rev_alloc(0i32);
        s.rev_set(counter, 1);
        s.rev_set(counter, 2);
        assert_eq!(*s.rev_get(counter), 2);
        s.restore_to(marker);
        assert_eq!(s.state.rev_arena.len(), 0);
    }

    #[test]
    fn nested_rev_set_restores_intermediate_value() {
        let mut s = Solver::new(SolverConfig::default());
        let counter = s.rev_alloc(0i32);
        let outer = s.mark();
        s.rev_set(counter, 1);
        let inner = s.mark();
        s.rev_set(counter, 2);
        s.restore_to(inner);
        assert_eq!(*s.rev_get(counter), 1);
        s.restore_to(outer);
        assert_eq!(*s.rev_get(counter), 0);
    }
}
