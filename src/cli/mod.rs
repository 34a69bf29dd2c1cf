// src/cli/mod.rs
//! Command-line interface definitions

/// Clap argument structures
pub mod commands;

pub use commands::{Action, Commands, ConfigOptions, StartOptions};
