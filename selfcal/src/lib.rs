//! Command construction for self-calibration tool invocations.
//!
//! A tool invocation (WSClean imaging or DP3 calibration) is described as a
//! typed [`core::command::Command`], rendered to a deterministic argv, and
//! optionally rewritten by modifiers that make it run inside a Singularity
//! container or across several nodes with `mpirun`.
//!
//! - **[`core`]**: Pure, deterministic logic (command model, rendering,
//!   modifiers, the self-calibration plan). No I/O.
//! - **[`io`]**: Config files, command description files, SLURM environment.
//!
//! [`environment`] and [`plan`] join the two for the CLI.

pub mod core;
pub mod environment;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod plan;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
