// src/utils/mod.rs
//! Shared error handling and logging infrastructure

/// Error types and handling utilities
///
/// Contains the [`BotError`] enum which defines every failure the bot
/// can report, along with conversion implementations.
pub mod error;

/// Logging initialization and line format
pub mod logging;

// Re-export for easier access
pub use error::BotError;
pub use logging::init_logging;
