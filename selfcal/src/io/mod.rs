//! I/O helpers for selfcal commands.

pub mod command_file;
pub mod config;
pub mod slurm;
