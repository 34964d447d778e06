//! `cpkernel`: a reversible-state, propagation, and search-tree core for
//! finite-domain constraint programming, in the spirit of OR-Tools'
//! `constraint_solver`.
//!
//! The public surface is organized by concern: [`backtrack`] (the trail),
//! [`domain`] (variables and expressions), [`propagation`] (the demon queue
//! and `Constraint` trait), [`search`] (the decision tree and monitors),
//! [`assignment`] (solution snapshots), and [`constraints`] (the two
//! reference global constraints). [`Solver`] is the single type gluing all
//! of them together.

pub mod assignment;
pub mod backtrack;
pub mod collections;
pub mod constraints;
pub mod domain;
pub mod error;
pub mod propagation;
pub mod search;
mod solver;

pub use error::{Fail, PropagResult, Status};
pub use solver::{RevRef, Solver, SolverConfig};
