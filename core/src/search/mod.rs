//! Decisions, decision builders, monitors and the DFS search loop
//! (`spec.md` §4.4, §6).

mod decision;
mod decision_builder;
mod limits;
mod log;
mod monitor;
mod nogood;
mod restart;
mod tree;
pub mod tunables;

pub use decision::{CustomDecision, Decision};
pub use decision_builder::{first_unbound, min_value, smallest_domain, CustomDecisionBuilder, DecisionBuilder, ValSelector, VarSelector};
pub use limits::Limits;
pub use log::LoggingMonitor;
pub use monitor::SearchMonitor;
pub use nogood::{Nogood, NogoodStore};
pub use restart::RestartMonitor;
pub use tree::Search;
