//! The domain & variable model (`spec.md` §4.2): integer variables, interval
//! variables, and the expressions built over them.

pub mod events;
pub mod expr;
pub mod int_var;
pub mod interval_var;

/// The integer type used throughout the kernel for domain bounds and
/// constants. Widened to `i64` under the `i64` feature, mirroring the
/// additive feature pair this crate's ancestor exposes for the same reason:
/// do not enable it for a single workspace member only.
#[cfg(not(feature = "i64"))]
pub type IntCst = i32;
#[cfg(feature = "i64")]
pub type IntCst = i64;

pub use events::DomainEvent;
pub use expr::{CustomExpr, IntExprId};
pub use int_var::IntVar;
pub use interval_var::{IntervalVar, Presence};
