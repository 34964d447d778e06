use crate::create_ref_type;
use crate::propagation::ConstraintId;

create_ref_type!(DemonId);

/// A demon's scheduling class (`spec.md` §4.3).
///
/// `Normal` demons are fine-grained rules that run as soon as they are
/// scheduled; `Delayed` demons are coarse, expensive rules that only run
/// once the `Normal` queue has fully drained, so that many small updates in
/// a row don't each trigger a full re-scan.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Priority {
    Normal,
    Delayed,
}

/// A registered, atomic unit of propagation work.
///
/// A demon does not carry a closure: it names the constraint that owns it
/// and a `local_id` the constraint uses to tell which of its own rules to
/// run (`Constraint::run_demon`). This is the arena-index collapse of
/// OR-Tools's many per-variable demon subclasses into one record type, per
/// the "virtual dispatch" redesign flag in `spec.md` §9 — the dispatch still
/// happens, but through the constraint's own `match`, not through a vtable
/// per demon.
pub(crate) struct DemonRecord {
    pub(crate) constraint: ConstraintId,
    pub(crate) local_id: u32,
    pub(crate) priority: Priority,
    /// Name used by monitors to attribute propagation to a constraint.
    pub(crate) name: &'static str,
}

/// The public handle to a registered [`DemonRecord`].
pub type Demon = DemonId;
