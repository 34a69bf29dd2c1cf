// src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of one successful poll of the pool statistics API
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Combined hash rate of all workers (H/s)
    pub hash_rate: f64,
    /// Combined valid share count
    pub valid_shares: u64,
    /// Confirmed balance in atomic units (1 XMR = 10^12), if reported
    pub confirmed_balance: Option<u64>,
    /// Per-worker statistics in the order the pool returned them
    pub workers: Vec<WorkerStat>,
}

/// Statistics for a single mining rig
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerStat {
    /// Worker name as reported to the pool
    pub name: String,
    /// Current hash rate (H/s)
    pub hash_rate: f64,
    /// Accepted shares
    pub valid_shares: u64,
    /// Stale shares
    pub stale_shares: u64,
    /// Time of the most recent share, absent if the pool never saw one
    pub last_share: Option<DateTime<Utc>>,
}

/// Opaque reference to a message previously created by the bot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHandle(pub String);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labeled value inside a rendered status message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbedField {
    /// Label shown above the value
    pub name: String,
    /// Markdown body
    pub value: String,
    /// Rendered side by side with neighbouring inline fields
    pub inline: bool,
}

/// Structured display payload produced from a [`StatsSnapshot`]
///
/// Serializes to the chat platform's embed object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMessage {
    /// Heading line
    pub title: String,
    /// 24-bit RGB colour
    pub color: u32,
    /// Labeled values in display order
    pub fields: Vec<EmbedField>,
}

impl RenderedMessage {
    /// Looks up a field value by its label
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Body of an outbound chat message
#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    /// Rich status message
    Embed(RenderedMessage),
    /// Plain text, used for error notices
    Text(String),
}
