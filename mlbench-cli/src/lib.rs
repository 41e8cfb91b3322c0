//! Support library for the mlbench binaries.
//!
//! Exposes the command pipeline, logging setup, and the shared entry points
//! so the `mlbench` CLI and the four standalone benchmark executables behave
//! identically, and so tests can drive them without forking a subprocess.

pub mod cli;
pub mod entry;
pub mod logging;
