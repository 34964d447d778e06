//! Error kinds, per `spec.md` §7.
//!
//! `Fail` is the value threaded through mutators and propagation: it is
//! *not* an exception, it is returned and short-circuited with `?` up to the
//! nearest choice point (for [`Fail::DomainEmptied`] / [`Fail::ConstraintInconsistent`])
//! or to the search root (for [`Fail::LimitReached`]). API-contract violations
//! (`Misuse`) are a different class entirely: they panic, the same way the
//! teacher's own trail panics on `restore_last_with` past the root.

use crate::domain::IntVar;

/// The reason a propagation pass or a search step failed.
///
/// This is the `?`-propagated value, not a [`std::error::Error`]: it never
/// escapes past the nearest choice point, so it intentionally does not
/// implement `std::error::Error` or carry a backtrace.
#[derive(Debug, Clone)]
pub enum Fail {
    /// A mutator reduced `var`'s domain to the empty set.
    DomainEmptied { var: IntVar },
    /// A constraint detected its own inconsistency outside of a single
    /// variable mutation (e.g. during `initial_propagate`).
    ConstraintInconsistent { constraint: &'static str },
    /// A search limit (time, fail count, branch count, solution count) was
    /// reached; unwinds all the way to the search root.
    LimitReached,
}

/// The outcome of `propagate()` / a mutator: either the change went through
/// (and we report whether anything actually changed, for idempotence), or it
/// would have failed.
pub type PropagResult<T = bool> = Result<T, Fail>;

/// `solve(...)`'s user-visible status, per `spec.md` §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A solution was produced and is available via the solver.
    Feasible,
    /// The search space was exhausted without finding a solution.
    Infeasible,
    /// A monitor limit stopped the search before exhaustion.
    Limit,
    /// The search could not run at all (e.g. posting-time inconsistency).
    Error,
}
