//! Command implementations for the `datemark` binary.

pub mod config;
pub mod run;
