// src/config/mod.rs
//! Configuration management for the stats bot
//!
//! Settings come from the environment (`TOKEN`, `CHANNEL_ID`,
//! `WALLET_ADDRESS`, `PORT`, ...) and optionally a TOML file. A missing
//! required value is fatal at startup.

/// Core configuration implementation
///
/// Contains the [`Config`] struct and the file/environment merge logic.
pub mod config;

// Re-export key items for easy access
pub use config::{Config, FileConfig};

use crate::utils::error::BotError;
use std::path::Path;

/// Loads configuration from an optional TOML file plus the environment
///
/// # Returns
/// * `Ok(Config)` - All required values present and valid
/// * `Err(BotError)` - File unreadable, or a value missing or malformed
pub fn load(path: Option<&Path>) -> Result<Config, BotError> {
    Config::load(path)
}

/// Generates a commented configuration template
pub fn generate_template() -> String {
    Config::generate_template()
}
