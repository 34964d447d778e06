use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use crate::create_ref_type;
use crate::domain::events::DomainEvent;
use crate::domain::IntCst;
use crate::error::{Fail, PropagResult};
use crate::propagation::{Demon, Priority};
use crate::solver::Solver;

create_ref_type!(IntVar);

/// Which watch lists fired for a single mutation, computed once and reused
/// both to notify demons and (in tests) to assert the right events raised.
#[derive(Copy, Clone, Default)]
pub(crate) struct FiredEvents {
    pub(crate) bound: bool,
    pub(crate) range: bool,
    pub(crate) domain: bool,
    pub(crate) value: bool,
}

/// The storage backing a single [`IntVar`].
///
/// `holes` is `None` for the common case of a dense `[min, max]` interval
/// domain and is only materialized into a bitset (over the variable's
/// *original* range, fixed at creation) the first time a value strictly
/// inside the current bounds is removed. This is the Rust-idiomatic
/// collapse of the range-only/hole-punching variable class hierarchy named
/// in `spec.md` §9's "deep inheritance" redesign flag into one struct with
/// an optional field.
pub(crate) struct IntVarData {
    orig_min: IntCst,
    orig_max: IntCst,
    min: IntCst,
    max: IntCst,
    holes: Option<Box<FixedBitSet>>,
    size: u64,
    name: Option<Box<str>>,
    watch_bound: SmallVec<[Demon; 4]>,
    watch_range: SmallVec<[Demon; 4]>,
    watch_domain: SmallVec<[Demon; 4]>,
    watch_value: SmallVec<[Demon; 4]>,
}

impl IntVarData {
    fn dense(lb: IntCst, ub: IntCst) -> Self {
        IntVarData {
            orig_min: lb,
            orig_max: ub,
            min: lb,
            max: ub,
            holes: None,
            size: (ub - lb + 1) as u64,
            name: None,
            watch_bound: SmallVec::new(),
            watch_range: SmallVec::new(),
            watch_domain: SmallVec::new(),
            watch_value: SmallVec::new(),
        }
    }

    fn bit(&self, v: IntCst) -> usize {
        (v - self.orig_min) as usize
    }

    fn excluded(&self, v: IntCst) -> bool {
        match &self.holes {
            Some(h) => h.contains(self.bit(v)),
            None => false,
        }
    }

    pub(crate) fn contains(&self, v: IntCst) -> bool {
        v >= self.min && v <= self.max && !self.excluded(v)
    }

    pub(crate) fn min(&self) -> IntCst {
        self.min
    }
    pub(crate) fn max(&self) -> IntCst {
        self.max
    }
    pub(crate) fn size(&self) -> u64 {
        self.size
    }
    pub(crate) fn is_bound(&self) -> bool {
        self.min == self.max
    }

    /// A clone of the parts a mutation needs to be able to undo.
    fn snapshot(&self) -> (IntCst, IntCst, Option<Box<FixedBitSet>>, u64) {
        (self.min, self.max, self.holes.clone(), self.size)
    }

    fn restore(&mut self, snap: (IntCst, IntCst, Option<Box<FixedBitSet>>, u64)) {
        self.min = snap.0;
        self.max = snap.1;
        self.holes = snap.2;
        self.size = snap.3;
    }

    /// Advances `min` past excluded values and recedes `max` likewise,
    /// maintaining the invariant that the bounds are themselves members.
    fn normalize(&mut self) {
        if self.holes.is_some() {
            while self.min <= self.max && self.excluded(self.min) {
                self.min += 1;
            }
            while self.max >= self.min && self.excluded(self.max) {
                self.max -= 1;
            }
        }
    }

    fn recompute_size(&mut self) {
        self.size = if self.min > self.max {
            0
        } else if let Some(h) = &self.holes {
            (self.min..=self.max).filter(|&v| !h.contains(self.bit(v))).count() as u64
        } else {
            (self.max - self.min + 1) as u64
        };
    }

    fn mark_excluded(&mut self, v: IntCst) {
        if v < self.orig_min || v > self.orig_max {
            return;
        }
        if self.holes.is_none() {
            let width = (self.orig_max - self.orig_min + 1) as usize;
            self.holes = Some(Box::new(FixedBitSet::with_capacity(width)));
        }
        let idx = self.bit(v);
        self.holes.as_mut().unwrap().insert(idx);
    }
}

impl Solver {
    /// Creates a new `IntVar` with domain `[lb, ub]`.
    pub fn new_int_var(&mut self, lb: IntCst, ub: IntCst) -> IntVar {
        assert!(lb <= ub, "empty initial domain [{lb}, {ub}]");
        self.state.vars.push(IntVarData::dense(lb, ub))
    }

    /// Creates a new `IntVar` whose domain is exactly `values` (deduplicated,
    /// may contain gaps).
    pub fn new_int_var_from_values(&mut self, values: &[IntCst]) -> IntVar {
        assert!(!values.is_empty(), "IntVar must have a non-empty initial domain");
        let mut sorted: Vec<IntCst> = values.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        let lb = sorted[0];
        let ub = *sorted.last().unwrap();
        let mut data = IntVarData::dense(lb, ub);
        if sorted.len() as i64 != (ub - lb + 1) as i64 {
            let width = (ub - lb + 1) as usize;
            let mut present = FixedBitSet::with_capacity(width);
            for &v in &sorted {
                present.insert((v - lb) as usize);
            }
            present.toggle_range(..);
            data.holes = Some(Box::new(present));
        }
        data.size = sorted.len() as u64;
        self.state.vars.push(data)
    }

    /// Creates a new named `IntVar` with domain `[lb, ub]`.
    pub fn new_named_int_var(&mut self, lb: IntCst, ub: IntCst, name: impl Into<String>) -> IntVar {
        let v = self.new_int_var(lb, ub);
        self.state.vars[v].name = Some(name.into().into_boxed_str());
        v
    }

    pub fn name_of(&self, v: IntVar) -> Option<&str> {
        self.state.vars[v].name.as_deref()
    }

    pub fn min(&self, v: IntVar) -> IntCst {
        self.state.vars[v].min()
    }
    pub fn max(&self, v: IntVar) -> IntCst {
        self.state.vars[v].max()
    }
    pub fn size(&self, v: IntVar) -> u64 {
        self.state.vars[v].size()
    }
    pub fn is_bound(&self, v: IntVar) -> bool {
        self.state.vars[v].is_bound()
    }
    pub fn contains(&self, v: IntVar, val: IntCst) -> bool {
        self.state.vars[v].contains(val)
    }

    /// A restartable, finite iterator over the variable's current domain.
    /// A snapshot cursor over the bitset at call time: later mutations to
    /// `v` do not retroactively change an iterator already handed out, and
    /// the iterator must not outlive the propagation round it was taken in
    /// (`spec.md` §9 "coroutine-like iteration").
    pub fn iter_domain(&self, v: IntVar) -> impl Iterator<Item = IntCst> + '_ {
        let data = &self.state.vars[v];
        (data.min..=data.max).filter(move |&x| data.contains(x))
    }

    fn add_watch(&mut self, v: IntVar, event: DomainEvent, demon: Demon) {
        let data = &mut self.state.vars[v];
        let list = match event {
            DomainEvent::Bound => &mut data.watch_bound,
            DomainEvent::Range => &mut data.watch_range,
            DomainEvent::Domain => &mut data.watch_domain,
            DomainEvent::Value => &mut data.watch_value,
        };
        list.push(demon);
    }

    /// Attaches `demon` so that it is scheduled whenever `event` fires on `v`.
    pub fn watch(&mut self, v: IntVar, event: DomainEvent, demon: Demon) {
        self.add_watch(v, event, demon);
    }

    /// Convenience: watches every change event.
    pub fn watch_any(&mut self, v: IntVar, demon: Demon) {
        for event in DomainEvent::ALL {
            self.add_watch(v, event, demon);
        }
    }

    fn notify(&mut self, v: IntVar, fired: FiredEvents) {
        let data = &self.state.vars[v];
        let mut to_enqueue: SmallVec<[Demon; 8]> = SmallVec::new();
        if fired.domain {
            to_enqueue.extend(data.watch_domain.iter().copied());
        }
        if fired.range {
            to_enqueue.extend(data.watch_range.iter().copied());
        }
        if fired.bound {
            to_enqueue.extend(data.watch_bound.iter().copied());
        }
        if fired.value {
            to_enqueue.extend(data.watch_value.iter().copied());
        }
        for demon in to_enqueue {
            self.enqueue(demon);
        }
    }

    /// The single primitive all other mutators reduce to: exclude every
    /// value in `[min, max]` matching `remove`, fail if the domain would
    /// become empty, and notify watchers otherwise.
    fn remove_matching(&mut self, v: IntVar, is_value_assignment: bool, remove: impl Fn(IntCst) -> bool) -> PropagResult<bool> {
        let data = &self.state.vars[v];
        let old_min = data.min;
        let old_max = data.max;
        let old_size = data.size;
        let snapshot = data.snapshot();

        let touched = (old_min..=old_max).any(|val| remove(val) && data.contains(val));
        if !touched {
            return Ok(false);
        }

        let data = &mut self.state.vars[v];
        for val in old_min..=old_max {
            if remove(val) {
                data.mark_excluded(val);
            }
        }
        data.normalize();
        data.recompute_size();

        if data.size == 0 {
            // Undo in-place before reporting failure: the variable must
            // never be observed empty past this call.
            data.restore(snapshot);
            return Err(Fail::DomainEmptied { var: v });
        }

        let new_min = data.min;
        let new_max = data.max;
        let new_size = data.size;

        self.trail.save(move |state| {
            state.vars[v].restore(snapshot.clone());
        });

        let fired = FiredEvents {
            domain: true,
            range: new_min != old_min || new_max != old_max,
            bound: old_size > 1 && new_size == 1,
            value: is_value_assignment && new_size == 1,
        };
        self.notify(v, fired);
        Ok(true)
    }

    /// Tightens the lower bound to `max(min, m)`.
    pub fn set_min(&mut self, v: IntVar, m: IntCst) -> PropagResult<bool> {
        if m <= self.min(v) {
            return Ok(false);
        }
        self.remove_matching(v, false, move |x| x < m)
    }

    /// Tightens the upper bound to `min(max, m)`.
    pub fn set_max(&mut self, v: IntVar, m: IntCst) -> PropagResult<bool> {
        if m >= self.max(v) {
            return Ok(false);
        }
        self.remove_matching(v, false, move |x| x > m)
    }

    /// Intersects the domain with `[l, u]`.
    pub fn set_range(&mut self, v: IntVar, l: IntCst, u: IntCst) -> PropagResult<bool> {
        self.remove_matching(v, false, move |x| x < l || x > u)
    }

    /// Reduces the domain to `{val}`.
    pub fn set_value(&mut self, v: IntVar, val: IntCst) -> PropagResult<bool> {
        self.remove_matching(v, true, move |x| x != val)
    }

    /// Removes a single value from the domain.
    pub fn remove_value(&mut self, v: IntVar, val: IntCst) -> PropagResult<bool> {
        self.remove_matching(v, false, move |x| x == val)
    }

    /// Removes every value in `[a, b]`.
    pub fn remove_interval(&mut self, v: IntVar, a: IntCst, b: IntCst) -> PropagResult<bool> {
        self.remove_matching(v, false, move |x| x >= a && x <= b)
    }

    /// Batch-removes every value in `vs`.
    pub fn remove_values(&mut self, v: IntVar, vs: &[IntCst]) -> PropagResult<bool> {
        let set: hashbrown::HashSet<IntCst> = vs.iter().copied().collect();
        self.remove_matching(v, false, move |x| set.contains(&x))
    }

    /// Intersects the domain with `vs`.
    pub fn set_values(&mut self, v: IntVar, vs: &[IntCst]) -> PropagResult<bool> {
        let set: hashbrown::HashSet<IntCst> = vs.iter().copied().collect();
        self.remove_matching(v, false, move |x| !set.contains(&x))
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::{Solver, SolverConfig};

    #[test]
    fn range_and_holes() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(0, 9);
        assert_eq!(s.size(x), 10);
        s.set_range(x, 3, 7).unwrap();
        assert_eq!((s.min(x), s.max(x)), (3, 7));
        s.remove_value(x, 5).unwrap();
        assert!(!s.contains(x, 5));
        assert_eq!(s.size(x), 3);
        assert_eq!(s.iter_domain(x).collect::<Vec<_>>(), vec![3, 4, 6, 7]);
    }

    #[test]
    fn trail_round_trip() {
        // spec.md S4
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(0, 9);
        let marker = s.mark();
        s.set_range(x, 3, 7).unwrap();
        s.remove_value(x, 5).unwrap();
        s.restore_to(marker);
        assert_eq!(s.iter_domain(x).collect::<Vec<_>>(), (0..=9).collect::<Vec<_>>());
    }

    #[test]
    fn set_value_fails_outside_domain() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var_from_values(&[1, 3, 5]);
        assert!(s.set_value(x, 2).is_err());
        assert!(s.set_value(x, 3).is_ok());
        assert_eq!(s.min(x), 3);
        assert_eq!(s.max(x), 3);
    }

    #[test]
    fn empty_domain_fails() {
        let mut s = Solver::new(SolverConfig::default());
        let x = s.new_int_var(0, 0);
        assert!(s.remove_value(x, 0).is_err());
    }
}
