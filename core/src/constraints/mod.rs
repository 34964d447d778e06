//! Reference constraints atop the core (`spec.md` §2, §6): each one is a
//! plain [`crate::propagation::Constraint`] impl posted via [`crate::Solver::post`],
//! registering demons on its argument variables and pruning only through the
//! ordinary `IntVar` mutator API — no special-cased engine support.

mod all_different;
mod difference;
mod element;
mod equality;
mod gcc;
mod soft_gcc;
mod sum;

pub use all_different::AllDifferent;
pub use difference::Difference;
pub use element::Element;
pub use equality::Equality;
pub use gcc::{Gcc, GccArgs};
pub use soft_gcc::{SoftGcc, SoftGccArgs};
pub use sum::{SumEquals, SumWithBound};
