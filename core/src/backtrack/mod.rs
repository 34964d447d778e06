//! Reversible state: the trail (`spec.md` §4.1).

mod trail;

pub use trail::{Mark, Trail};
