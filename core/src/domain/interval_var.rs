use crate::create_ref_type;
use crate::domain::events::DomainEvent;
use crate::domain::{IntCst, IntVar};
use crate::error::PropagResult;
use crate::propagation::{Constraint, ConstraintId, Priority};
use crate::solver::Solver;

create_ref_type!(IntervalVar);

/// Whether an optional interval is known to take part in the schedule.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Presence {
    Present,
    Absent,
    Optional,
}

/// `start`/`duration`/`end`/`performed` are each small `IntVar`s
/// (`spec.md` §3, §4.2); `performed`'s domain is a subset of `{0, 1}`.
pub(crate) struct IntervalVarData {
    pub(crate) start: IntVar,
    pub(crate) duration: IntVar,
    pub(crate) end: IntVar,
    pub(crate) performed: IntVar,
}

impl Solver {
    /// Creates a new `IntervalVar`. `presence` fixes or bounds the
    /// `performed` field: `Present`/`Absent` bind it immediately, `Optional`
    /// leaves it as `{0, 1}`.
    #[allow(clippy::too_many_arguments)]
    pub fn new_interval_var(
        &mut self,
        start_min: IntCst,
        start_max: IntCst,
        duration_min: IntCst,
        duration_max: IntCst,
        end_min: IntCst,
        end_max: IntCst,
        presence: Presence,
    ) -> IntervalVar {
        let start = self.new_int_var(start_min, start_max);
        let duration = self.new_int_var(duration_min, duration_max);
        let end = self.new_int_var(end_min, end_max);
        let performed = match presence {
            Presence::Present => self.new_int_var(1, 1),
            Presence::Absent => self.new_int_var(0, 0),
            Presence::Optional => self.new_int_var(0, 1),
        };
        let iv = self.state.intervals.push(IntervalVarData { start, duration, end, performed });
        // The structural invariant `end = start + duration` is enforced by a
        // plain constraint like any other, not by special-casing IntervalVar
        // in the propagation engine (`spec.md` §4.2).
        self.post(IntervalLink { start, duration, end, performed })
            .expect("posting the structural interval constraint cannot fail on a fresh variable");
        iv
    }

    pub fn interval_start(&self, iv: IntervalVar) -> IntVar {
        self.state.intervals[iv].start
    }
    pub fn interval_duration(&self, iv: IntervalVar) -> IntVar {
        self.state.intervals[iv].duration
    }
    pub fn interval_end(&self, iv: IntervalVar) -> IntVar {
        self.state.intervals[iv].end
    }
    pub fn interval_performed(&self, iv: IntervalVar) -> IntVar {
        self.state.intervals[iv].performed
    }

    pub fn interval_presence(&self, iv: IntervalVar) -> Presence {
        let performed = self.interval_performed(iv);
        if self.is_bound(performed) {
            if self.min(performed) == 1 {
                Presence::Present
            } else {
                Presence::Absent
            }
        } else {
            Presence::Optional
        }
    }

    pub fn set_start_min(&mut self, iv: IntervalVar, m: IntCst) -> PropagResult<bool> {
        self.set_min(self.interval_start(iv), m)
    }
    pub fn set_start_max(&mut self, iv: IntervalVar, m: IntCst) -> PropagResult<bool> {
        self.set_max(self.interval_start(iv), m)
    }
    pub fn set_duration_min(&mut self, iv: IntervalVar, m: IntCst) -> PropagResult<bool> {
        self.set_min(self.interval_duration(iv), m)
    }
    pub fn set_duration_max(&mut self, iv: IntervalVar, m: IntCst) -> PropagResult<bool> {
        self.set_max(self.interval_duration(iv), m)
    }
    pub fn set_end_min(&mut self, iv: IntervalVar, m: IntCst) -> PropagResult<bool> {
        self.set_min(self.interval_end(iv), m)
    }
    pub fn set_end_max(&mut self, iv: IntervalVar, m: IntCst) -> PropagResult<bool> {
        self.set_max(self.interval_end(iv), m)
    }
    pub fn set_performed(&mut self, iv: IntervalVar, performed: bool) -> PropagResult<bool> {
        self.set_value(self.interval_performed(iv), performed as IntCst)
    }

    /// Watches `demon` on any change to any of the four fields.
    pub fn watch_interval_any_change(&mut self, iv: IntervalVar, demon: crate::propagation::Demon) {
        let data = &self.state.intervals[iv];
        let (start, duration, end, performed) = (data.start, data.duration, data.end, data.performed);
        self.watch(start, DomainEvent::Domain, demon);
        self.watch(duration, DomainEvent::Domain, demon);
        self.watch(end, DomainEvent::Domain, demon);
        self.watch(performed, DomainEvent::Domain, demon);
    }
}

/// Maintains `end = start + duration` whenever `performed` may be true.
struct IntervalLink {
    start: IntVar,
    duration: IntVar,
    end: IntVar,
    performed: IntVar,
}

impl Constraint for IntervalLink {
    fn post(&mut self, id: ConstraintId, solver: &mut Solver) -> PropagResult<()> {
        let demon = solver.register_demon(id, 0, Priority::Normal, "interval_link");
        solver.watch(self.start, DomainEvent::Range, demon);
        solver.watch(self.duration, DomainEvent::Range, demon);
        solver.watch(self.end, DomainEvent::Range, demon);
        solver.watch(self.performed, DomainEvent::Bound, demon);
        Ok(())
    }

    fn initial_propagate(&mut self, solver: &mut Solver) -> PropagResult<()> {
        self.run_demon(0, solver)
    }

    fn run_demon(&mut self, _local_id: u32, solver: &mut Solver) -> PropagResult<()> {
        if solver.is_bound(self.performed) && solver.min(self.performed) == 0 {
            // definitely absent: the link is vacuously satisfied
            return Ok(());
        }
        let (s_min, s_max) = (solver.min(self.start), solver.max(self.start));
        let (d_min, d_max) = (solver.min(self.duration), solver.max(self.duration));
        let (e_min, e_max) = (solver.min(self.end), solver.max(self.end));

        solver.set_min(self.end, s_min + d_min)?;
        solver.set_max(self.end, s_max + d_max)?;
        solver.set_min(self.start, e_min - d_max)?;
        solver.set_max(self.start, e_max - d_min)?;
        solver.set_min(self.duration, e_min - s_max)?;
        solver.set_max(self.duration, e_max - s_min)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "interval_link"
    }
}
