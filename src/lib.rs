//! HashVault stats bot
//!
//! Polls the HashVault pool API for a wallet's mining statistics and keeps
//! a single status message in a Discord channel up to date:
//! - Hash rate, balance and per-worker share formatting
//! - Create-once, edit-thereafter publishing
//! - Serialized polling loop with log-or-notify error handling
//! - Optional liveness endpoint

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Status message publishing and the polling loop
pub mod publisher;

/// Chat platform client and liveness endpoint
pub mod network;

/// Pool statistics fetching and formatting
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use network::{ChatPlatform, DiscordClient};
pub use publisher::{MessageSink, Scheduler};
pub use stats::{Renderer, StatsClient, StatsSource};
pub use types::{MessageHandle, RenderedMessage, StatsSnapshot, WorkerStat};
pub use utils::{BotError, init_logging};
