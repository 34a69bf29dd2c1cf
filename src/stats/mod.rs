//! Pool statistics: fetching and formatting
//!
//! - [`client`] polls the HashVault wallet stats endpoint
//! - [`format`] turns snapshots into human-readable chat payloads

/// Wallet statistics API client
pub mod client;

/// Pure formatting of hash rates, balances, times and worker tables
pub mod format;

// Re-export main components
pub use client::{StatsClient, StatsSource};
pub use format::{Renderer, format_balance, format_hash_rate, format_relative_time};
