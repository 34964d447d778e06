use std::collections::VecDeque;

use hashbrown::HashSet;

use crate::error::{Fail, PropagResult};
use crate::propagation::constraint::{Constraint, ConstraintId};
use crate::propagation::demon::{Demon, DemonId, DemonRecord, Priority};
use crate::solver::Solver;

/// The two-priority-class queue of pending demons (`spec.md` §4.3).
///
/// Not part of the reversible [`crate::backtrack::Trail`]: on failure the
/// whole queue is discarded rather than rewound (`spec.md` §4.3 fail
/// semantics: "pending queues are discarded").
#[derive(Default)]
pub struct PropQueue {
    normal: VecDeque<DemonId>,
    delayed: VecDeque<DemonId>,
    pending: HashSet<DemonId>,
    freeze_depth: u32,
}

impl PropQueue {
    fn enqueue(&mut self, id: DemonId, priority: Priority) {
        if !self.pending.insert(id) {
            // already scheduled this round: coalesce (spec.md §8 property 3).
            return;
        }
        match priority {
            Priority::Normal => self.normal.push_back(id),
            Priority::Delayed => self.delayed.push_back(id),
        }
    }

    /// Dequeues the next demon to run: every `Normal` demon runs before any
    /// `Delayed` demon (spec.md §8 property 4).
    fn pop_ready(&mut self) -> Option<DemonId> {
        let id = self.normal.pop_front().or_else(|| self.delayed.pop_front())?;
        self.pending.remove(&id);
        Some(id)
    }

    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.delayed.is_empty()
    }

    pub fn clear(&mut self) {
        self.normal.clear();
        self.delayed.clear();
        self.pending.clear();
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_depth > 0
    }
}

/// A [`Constraint`] placeholder used only to vacate a constraint's slot in
/// the arena for the duration of a demon call (see [`Solver::propagate`]).
/// Never actually invoked: it is swapped back out before `propagate` reads
/// the queue again.
struct Tombstone;
impl Constraint for Tombstone {
    fn post(&mut self, _id: ConstraintId, _solver: &mut Solver) -> PropagResult<()> {
        unreachable!("tombstone constraint should never be posted")
    }
    fn initial_propagate(&mut self, _solver: &mut Solver) -> PropagResult<()> {
        unreachable!("tombstone constraint should never be propagated")
    }
    fn run_demon(&mut self, _local_id: u32, _solver: &mut Solver) -> PropagResult<()> {
        unreachable!("tombstone constraint should never run a demon")
    }
    fn name(&self) -> &'static str {
        "<tombstone>"
    }
}

impl Solver {
    /// Registers a new demon for `constraint`, to be run via
    /// `Constraint::run_demon(local_id, ..)` whenever it is enqueued.
    ///
    /// Registration itself always yields a fresh [`DemonId`] — the
    /// idempotence named by `spec.md` §4.3's "register_demon — idempotent"
    /// is about repeated *scheduling* of the same demon, which `enqueue`
    /// coalesces, not about registration.
    pub fn register_demon(
        &mut self,
        constraint: ConstraintId,
        local_id: u32,
        priority: Priority,
        name: &'static str,
    ) -> Demon {
        self.demons.push(DemonRecord { constraint, local_id, priority, name })
    }

    /// Schedules `demon` to run; a no-op if it is already pending this round.
    pub fn enqueue(&mut self, demon: Demon) {
        let priority = self.demons[demon].priority;
        self.queue.enqueue(demon, priority);
    }

    /// Suspends dispatch of newly scheduled demons so that a demon can batch
    /// several emitted events before they are propagated, matching
    /// `spec.md` §4.3's nested `freeze_queue`/`unfreeze_queue`.
    pub fn freeze_queue(&mut self) {
        self.queue.freeze_depth += 1;
    }

    /// Reverses one `freeze_queue` call. Does not itself drain the queue;
    /// call [`Solver::propagate`] afterwards to do that.
    pub fn unfreeze_queue(&mut self) {
        self.queue.freeze_depth = self.queue.freeze_depth.saturating_sub(1);
    }

    /// Drains both priority queues to a fixed point, or to the first
    /// failure. No demon runs after a failure is raised in this pass; the
    /// remaining queue is discarded (`spec.md` §4.3 "Fail semantics").
    pub fn propagate(&mut self) -> PropagResult<()> {
        loop {
            if self.queue.is_frozen() {
                return Ok(());
            }
            let Some(demon) = self.queue.pop_ready() else {
                return Ok(());
            };
            let record = &self.demons[demon];
            let constraint_id = record.constraint;
            let local_id = record.local_id;

            // Vacate the constraint's slot so we can pass `self` to it
            // without a second mutable borrow of `self.constraints`.
            let mut constraint = std::mem::replace(&mut self.constraints[constraint_id], Box::new(Tombstone));
            let result = constraint.run_demon(local_id, self);
            self.constraints[constraint_id] = constraint;

            if let Err(fail) = result {
                self.queue.clear();
                return Err(fail);
            }
        }
    }

    /// Posts `constraint`, registers its demons, and runs its initial
    /// propagation. Matches `spec.md` §3: "After `InitialPropagate` returns,
    /// posting-time fixed point is reached or fail has been raised."
    pub fn post(&mut self, mut constraint: impl Constraint + 'static) -> PropagResult<ConstraintId> {
        let id = self.constraints.push(Box::new(Tombstone));
        constraint.post(id, self)?;
        constraint.initial_propagate(self)?;
        self.constraints[id] = Box::new(constraint);
        self.propagate()?;
        Ok(id)
    }
}

/// A demon run returning [`Fail::ConstraintInconsistent`] as a convenience
/// for constraints whose own invariant check (not a single variable
/// mutation) fails.
pub fn inconsistent(constraint_name: &'static str) -> Fail {
    Fail::ConstraintInconsistent { constraint: constraint_name }
}
