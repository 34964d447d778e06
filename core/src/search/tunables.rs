//! Search-policy constants, overridable via environment variables the same
//! way `solver/brancher.rs`'s `PREFER_MIN_VALUE`/`INITIALLY_ALLOWED_CONFLICTS`
//! are declared. None of these are invariants; they are defaults a monitor
//! may ignore entirely.

use env_param::EnvParam;

/// Fail count before the first restart fires in [`super::restart::RestartMonitor`].
pub static RESTART_INITIAL_FAILS: EnvParam<u64> = EnvParam::new("CPKERNEL_RESTART_INITIAL_FAILS", "100");

/// Multiplier applied to the fail threshold after each restart (geometric
/// restart policy).
pub static RESTART_GROWTH_FACTOR: EnvParam<u32> = EnvParam::new("CPKERNEL_RESTART_GROWTH_FACTOR", "2");

/// Soft cap on how many nogoods a restart policy should accumulate before it
/// stops contributing new ones, left to monitors that choose to honor it.
pub static NOGOOD_BUDGET: EnvParam<usize> = EnvParam::new("CPKERNEL_NOGOOD_BUDGET", "10000");
