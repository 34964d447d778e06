//! The propagation engine (`spec.md` §4.3): a priority queue of demons
//! dispatched on variable events, drained to a fixed point or to failure.

mod constraint;
mod demon;
mod queue;

pub use constraint::{Constraint, ConstraintId};
pub use demon::{Demon, DemonId, Priority};
pub(crate) use demon::DemonRecord;
pub use queue::{inconsistent, PropQueue};
