//! Stable exit codes for the selfcal CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid config, command file, arguments, or any other error.
pub const INVALID: i32 = 1;
