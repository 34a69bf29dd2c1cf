// src/network/mod.rs
//! External network collaborators
//!
//! - `DiscordClient`: REST access to the chat channel the bot posts into
//! - `health`: the plain liveness endpoint

/// Discord REST client
///
/// Creates, fetches and edits channel messages using a bot token.
pub mod discord;

/// Liveness HTTP endpoint served with axum
pub mod health;

// Re-export main components for cleaner imports
pub use discord::{ChatPlatform, DiscordClient};
