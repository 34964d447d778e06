//! Solution snapshots, decoupled from the live solver (`spec.md` §4.5).

mod proto;

pub use proto::{AssignmentProto, InMemoryProto, IntVarAssignment, IntervalVarAssignment, ObjectiveAssignment};

use hashbrown::HashMap;

use crate::domain::{IntCst, IntVar, IntervalVar};
use crate::error::PropagResult;
use crate::solver::Solver;

/// A captured `(min, max, active)` triple for one `IntVar`, independent of
/// the live solver (`spec.md` §4.5). Per the convention recorded in
/// `DESIGN.md`, `max` is always carried explicitly even when it equals `min`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntVarElement {
    var: IntVar,
    min: IntCst,
    max: IntCst,
    active: bool,
}

impl IntVarElement {
    fn fresh(var: IntVar) -> Self {
        IntVarElement { var, min: 0, max: 0, active: true }
    }

    pub fn var(&self) -> IntVar {
        self.var
    }
    /// Valid when the captured range is a singleton; otherwise equal to `min()`.
    pub fn value(&self) -> IntCst {
        self.min
    }
    pub fn min(&self) -> IntCst {
        self.min
    }
    pub fn max(&self) -> IntCst {
        self.max
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// A captured snapshot of the four component `IntVar`s of an `IntervalVar`
/// (`spec.md` §6's `interval_var_assignment` shape).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalVarElement {
    var: IntervalVar,
    start_min: IntCst,
    start_max: IntCst,
    duration_min: IntCst,
    duration_max: IntCst,
    end_min: IntCst,
    end_max: IntCst,
    performed_min: IntCst,
    performed_max: IntCst,
    active: bool,
}

impl IntervalVarElement {
    fn fresh(var: IntervalVar) -> Self {
        IntervalVarElement {
            var,
            start_min: 0,
            start_max: 0,
            duration_min: 0,
            duration_max: 0,
            end_min: 0,
            end_max: 0,
            performed_min: 0,
            performed_max: 0,
            active: true,
        }
    }

    pub fn var(&self) -> IntervalVar {
        self.var
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Maps a named subset of variables to captured elements, decoupled from the
/// solver's own lifetime (`spec.md` §3 "Assignment", §4.5).
///
/// Two `Assignment`s compare equal iff they track the same variables under
/// the same names and every element compares equal under §4.5's equality
/// relation (same variable, and either both deactivated or both active with
/// identical ranges).
#[derive(Default, Clone, Debug)]
pub struct Assignment {
    int_vars: Vec<IntVar>,
    int_elements: Vec<IntVarElement>,
    int_index: HashMap<IntVar, usize>,
    int_names: HashMap<IntVar, String>,

    interval_vars: Vec<IntervalVar>,
    interval_elements: Vec<IntervalVarElement>,
    interval_index: HashMap<IntervalVar, usize>,
    interval_names: HashMap<IntervalVar, String>,

    objective: Option<IntVarElement>,
    objective_name: Option<String>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `var` for tracking. Idempotent (`spec.md` §4.5).
    pub fn add(&mut self, solver: &Solver, var: IntVar) {
        if self.int_index.contains_key(&var) {
            return;
        }
        let idx = self.int_elements.len();
        self.int_index.insert(var, idx);
        self.int_vars.push(var);
        self.int_elements.push(IntVarElement::fresh(var));
        if let Some(name) = solver.name_of(var) {
            self.int_names.insert(var, name.to_string());
        }
    }

    pub fn add_all(&mut self, solver: &Solver, vars: &[IntVar]) {
        for &v in vars {
            self.add(solver, v);
        }
    }

    pub fn add_interval(&mut self, solver: &Solver, iv: IntervalVar) {
        if self.interval_index.contains_key(&iv) {
            return;
        }
        let idx = self.interval_elements.len();
        self.interval_index.insert(iv, idx);
        self.interval_vars.push(iv);
        self.interval_elements.push(IntervalVarElement::fresh(iv));
        let _ = solver; // interval vars carry no name of their own today
    }

    pub fn add_all_intervals(&mut self, solver: &Solver, ivs: &[IntervalVar]) {
        for &iv in ivs {
            self.add_interval(solver, iv);
        }
    }

    /// Associates `var` as the (single) objective. Replaces any previous one.
    pub fn set_objective(&mut self, solver: &Solver, var: IntVar) {
        self.objective = Some(IntVarElement::fresh(var));
        self.objective_name = solver.name_of(var).map(|s| s.to_string());
    }

    pub fn objective(&self) -> Option<&IntVarElement> {
        self.objective.as_ref()
    }

    fn int_idx(&self, var: IntVar) -> usize {
        *self.int_index.get(&var).expect("variable not tracked by this assignment")
    }
    fn interval_idx(&self, iv: IntervalVar) -> usize {
        *self.interval_index.get(&iv).expect("interval variable not tracked by this assignment")
    }

    pub fn value(&self, var: IntVar) -> IntCst {
        self.int_elements[self.int_idx(var)].value()
    }
    pub fn min(&self, var: IntVar) -> IntCst {
        self.int_elements[self.int_idx(var)].min
    }
    pub fn max(&self, var: IntVar) -> IntCst {
        self.int_elements[self.int_idx(var)].max
    }
    pub fn is_active(&self, var: IntVar) -> bool {
        self.int_elements[self.int_idx(var)].active
    }

    pub fn set_value(&mut self, var: IntVar, value: IntCst) {
        let e = &mut self.int_elements[self.int_idx(var)];
        e.min = value;
        e.max = value;
    }
    pub fn set_range(&mut self, var: IntVar, min: IntCst, max: IntCst) {
        let e = &mut self.int_elements[self.int_idx(var)];
        e.min = min;
        e.max = max;
    }
    pub fn activate(&mut self, var: IntVar) {
        self.int_elements[self.int_idx(var)].active = true;
    }
    pub fn deactivate(&mut self, var: IntVar) {
        self.int_elements[self.int_idx(var)].active = false;
    }

    pub fn interval_element(&self, iv: IntervalVar) -> &IntervalVarElement {
        &self.interval_elements[self.interval_idx(iv)]
    }
    pub fn activate_interval(&mut self, iv: IntervalVar) {
        self.interval_elements[self.interval_idx(iv)].active = true;
    }
    pub fn deactivate_interval(&mut self, iv: IntervalVar) {
        self.interval_elements[self.interval_idx(iv)].active = false;
    }

    /// Snapshots the live solver state of every tracked entity
    /// (`spec.md` §4.5 "store()").
    pub fn store(&mut self, solver: &Solver) {
        for (var, elem) in self.int_vars.iter().zip(self.int_elements.iter_mut()) {
            elem.min = solver.min(*var);
            elem.max = solver.max(*var);
            elem.active = true;
        }
        for (iv, elem) in self.interval_vars.iter().zip(self.interval_elements.iter_mut()) {
            let (start, duration, end, performed) =
                (solver.interval_start(*iv), solver.interval_duration(*iv), solver.interval_end(*iv), solver.interval_performed(*iv));
            elem.start_min = solver.min(start);
            elem.start_max = solver.max(start);
            elem.duration_min = solver.min(duration);
            elem.duration_max = solver.max(duration);
            elem.end_min = solver.min(end);
            elem.end_max = solver.max(end);
            elem.performed_min = solver.min(performed);
            elem.performed_max = solver.max(performed);
            elem.active = true;
        }
        if let Some(elem) = self.objective.as_mut() {
            elem.min = solver.min(elem.var);
            elem.max = solver.max(elem.var);
        }
    }

    /// Applies every snapshot back onto the live solver under a frozen
    /// propagation queue, raising [`crate::Fail`] if a captured range is
    /// incompatible with the variable's current domain (`spec.md` §4.5
    /// "restore()").
    pub fn restore(&self, solver: &mut Solver) -> PropagResult<()> {
        solver.freeze_queue();
        let result = self.restore_inner(solver);
        solver.unfreeze_queue();
        result?;
        solver.propagate()
    }

    fn restore_inner(&self, solver: &mut Solver) -> PropagResult<()> {
        for (var, elem) in self.int_vars.iter().zip(self.int_elements.iter()) {
            if !elem.active {
                continue;
            }
            solver.set_range(*var, elem.min, elem.max)?;
        }
        for (iv, elem) in self.interval_vars.iter().zip(self.interval_elements.iter()) {
            if !elem.active {
                continue;
            }
            let (start, duration, end, performed) =
                (solver.interval_start(*iv), solver.interval_duration(*iv), solver.interval_end(*iv), solver.interval_performed(*iv));
            solver.set_range(start, elem.start_min, elem.start_max)?;
            solver.set_range(duration, elem.duration_min, elem.duration_max)?;
            solver.set_range(end, elem.end_min, elem.end_max)?;
            solver.set_range(performed, elem.performed_min, elem.performed_max)?;
        }
        Ok(())
    }

    /// Deep-copies `other`'s tracked variables, snapshots and objective into
    /// `self`, replacing whatever `self` tracked before (`spec.md` §4.5
    /// "copy(other)").
    pub fn copy(&mut self, other: &Assignment) {
        *self = other.clone();
    }

    /// Writes every tracked snapshot into `proto` via the serialization
    /// collaborator (`spec.md` §6). Field omission on the wire is the
    /// collaborator's concern; the in-memory elements above never omit
    /// `max`.
    pub fn save(&self, proto: &mut dyn AssignmentProto) {
        proto.clear();
        for (var, elem) in self.int_vars.iter().zip(self.int_elements.iter()) {
            let name = self.int_names.get(var).cloned().unwrap_or_default();
            proto.push_int_var(IntVarAssignment { name, min: elem.min, max: elem.max, active: elem.active });
        }
        for (iv, elem) in self.interval_vars.iter().zip(self.interval_elements.iter()) {
            let name = self.interval_names.get(iv).cloned().unwrap_or_default();
            proto.push_interval_var(IntervalVarAssignment {
                name,
                start_min: elem.start_min,
                start_max: elem.start_max,
                duration_min: elem.duration_min,
                duration_max: elem.duration_max,
                end_min: elem.end_min,
                end_max: elem.end_max,
                performed_min: elem.performed_min,
                performed_max: elem.performed_max,
                active: elem.active,
            });
        }
        if let Some(elem) = &self.objective {
            let name = self.objective_name.clone().unwrap_or_default();
            proto.set_objective(Some(ObjectiveAssignment { name, min: elem.min, max: elem.max, active: elem.active }));
        } else {
            proto.set_objective(None);
        }
    }

    /// Reads `proto` back into `self`'s already-registered variables.
    ///
    /// Fast path: if `proto`'s int-var list is the same length as what
    /// `self` tracks, positions are assumed aligned and applied directly.
    /// Otherwise falls back to matching by name (`spec.md` §4.5 "load()").
    pub fn load(&mut self, proto: &dyn AssignmentProto) {
        let ints = proto.int_vars();
        if ints.len() == self.int_elements.len() {
            for (elem, rec) in self.int_elements.iter_mut().zip(ints.iter()) {
                elem.min = rec.min;
                elem.max = rec.max;
                elem.active = rec.active;
            }
        } else {
            let by_name: HashMap<&str, &IntVarAssignment> = ints.iter().map(|r| (r.name.as_str(), r)).collect();
            for (var, elem) in self.int_vars.iter().zip(self.int_elements.iter_mut()) {
                if let Some(name) = self.int_names.get(var) {
                    if let Some(rec) = by_name.get(name.as_str()) {
                        elem.min = rec.min;
                        elem.max = rec.max;
                        elem.active = rec.active;
                    }
                }
            }
        }

        let intervals = proto.interval_vars();
        if intervals.len() == self.interval_elements.len() {
            for (elem, rec) in self.interval_elements.iter_mut().zip(intervals.iter()) {
                apply_interval_record(elem, rec);
            }
        } else {
            let by_name: HashMap<&str, &IntervalVarAssignment> = intervals.iter().map(|r| (r.name.as_str(), r)).collect();
            for (iv, elem) in self.interval_vars.iter().zip(self.interval_elements.iter_mut()) {
                if let Some(name) = self.interval_names.get(iv) {
                    if let Some(rec) = by_name.get(name.as_str()) {
                        apply_interval_record(elem, rec);
                    }
                }
            }
        }

        if let (Some(obj), Some(rec)) = (self.objective.as_mut(), proto.objective()) {
            obj.min = rec.min;
            obj.max = rec.max;
            obj.active = rec.active;
        }
    }
}

fn apply_interval_record(elem: &mut IntervalVarElement, rec: &IntervalVarAssignment) {
    elem.start_min = rec.start_min;
    elem.start_max = rec.start_max;
    elem.duration_min = rec.duration_min;
    elem.duration_max = rec.duration_max;
    elem.end_min = rec.end_min;
    elem.end_max = rec.end_max;
    elem.performed_min = rec.performed_min;
    elem.performed_max = rec.performed_max;
    elem.active = rec.active;
}

impl PartialEq for Assignment {
    fn eq(&self, other: &Self) -> bool {
        if self.int_vars.len() != other.int_vars.len() || self.interval_vars.len() != other.interval_vars.len() {
            return false;
        }
        for var in &self.int_vars {
            let Some(&oi) = other.int_index.get(var) else { return false };
            let mine = &self.int_elements[self.int_idx(*var)];
            let theirs = &other.int_elements[oi];
            if !elements_equal(mine, theirs) {
                return false;
            }
        }
        for iv in &self.interval_vars {
            let Some(&oi) = other.interval_index.get(iv) else { return false };
            let mine = &self.interval_elements[self.interval_idx(*iv)];
            let theirs = &other.interval_elements[oi];
            if mine.active != theirs.active {
                return false;
            }
            if mine.active && mine != theirs {
                return false;
            }
        }
        self.objective == other.objective
    }
}

fn elements_equal(a: &IntVarElement, b: &IntVarElement) -> bool {
    if a.var != b.var || a.active != b.active {
        return false;
    }
    !a.active || (a.min == b.min && a.max == b.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverConfig;

    #[test]
    fn store_then_restore_is_a_no_op() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(0, 10);
        let y = s.new_int_var(0, 10);
        s.set_range(x, 3, 7).unwrap();

        let mut a = Assignment::new();
        a.add_all(&s, &[x, y]);
        a.store(&s);

        s.set_min(x, 4).unwrap();
        a.restore(&mut s).unwrap();

        assert_eq!(s.min(x), 3);
        assert_eq!(s.max(x), 7);
    }

    #[test]
    fn save_and_load_round_trips_through_the_collaborator() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_named_int_var(0, 10, "x");
        s.set_value(x, 6).unwrap();

        let mut a = Assignment::new();
        a.add(&s, x);
        a.store(&s);

        let mut proto = InMemoryProto::new("model");
        a.save(&mut proto);

        let mut b = Assignment::new();
        b.add(&s, x);
        b.load(&proto);

        assert_eq!(a, b);
    }

    #[test]
    fn equality_ignores_ranges_of_deactivated_elements() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(0, 10);

        let mut a = Assignment::new();
        a.add(&s, x);
        a.store(&s);
        a.deactivate(x);

        let mut b = Assignment::new();
        b.add(&s, x);
        b.store(&s);
        b.set_value(x, 9);
        b.deactivate(x);

        assert_eq!(a, b);
    }
}
