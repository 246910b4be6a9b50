//! Deterministic, pure logic for building tool invocations.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! command values and return deterministic argv tokens suitable for tests.

pub mod command;
pub mod modifier;
pub mod mpirun;
pub mod render;
pub mod scalar;
pub mod selfcal;
pub mod singularity;
pub mod tools;
