// src/stats/format.rs
//! Human-readable rendering of pool statistics
//!
//! Everything here is pure: the current time is passed in rather than
//! read from the clock, so output is deterministic for a given input.

use crate::types::{EmbedField, RenderedMessage, StatsSnapshot, WorkerStat};
use chrono::{DateTime, Utc};

/// Atomic units per XMR
const ATOMIC_UNITS_PER_XMR: u64 = 1_000_000_000_000;

/// Embed field values longer than this are rejected by the chat platform
pub const FIELD_VALUE_LIMIT: usize = 1024;

/// Shown in place of the worker table when the pool reports no workers
pub const NO_WORKERS: &str = "No active workers.";

/// Shown in place of a relative time when a worker never submitted a share
pub const NEVER: &str = "never";

const TITLE: &str = "⛏️ **HashVault Mining Stats** ⛏️";
const EMBED_COLOR: u32 = 0xff9c00;

/// Label of the balance field
pub const BALANCE_FIELD: &str = "🏆 Confirmed Balance";
/// Label of the collective hash rate field
pub const HASH_RATE_FIELD: &str = "⚡ Current Hash Rate";
/// Label of the valid share count field
pub const SHARES_FIELD: &str = "✅ Valid Shares";
/// Label of the worker table field
pub const WORKERS_FIELD: &str = "👷‍♂️ Active Workers";

const NAME_WIDTH: usize = 10;
const RATE_WIDTH: usize = 12;
const SHARES_WIDTH: usize = 8;
const STALE_WIDTH: usize = 6;

const RATE_UNITS: [&str; 4] = ["H/s", "kH/s", "MH/s", "GH/s"];

/// Formats a hash rate using the largest unit that keeps the value >= 1
///
/// GH/s, MH/s and kH/s are shown with two decimals; plain H/s as an integer.
/// The unit is chosen after rounding, so 999.6 H/s reads "1.00 kH/s".
pub fn format_hash_rate(rate: f64) -> String {
    let rate = rate.max(0.0);
    if rate.round() < 1e3 {
        return format!("{} H/s", rate.round() as u64);
    }

    let mut tier = 1;
    let mut scaled = round2(rate / 1e3);
    while scaled >= 1e3 && tier < RATE_UNITS.len() - 1 {
        tier += 1;
        scaled = round2(rate / 1e3f64.powi(tier as i32));
    }
    format!("{:.2} {}", scaled, RATE_UNITS[tier])
}

// f64::round is half-away-from-zero; `{:.2}` alone would round ties to even.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats an atomic-unit balance as XMR with eight decimals
///
/// Integer arithmetic avoids float drift on large balances.
pub fn format_balance(atomic: Option<u64>) -> String {
    let atomic = atomic.unwrap_or(0);
    // 10^12 atomic units / 10^8 displayed digits
    const STEP: u64 = 10_000;

    let mut whole = atomic / ATOMIC_UNITS_PER_XMR;
    let rem = atomic % ATOMIC_UNITS_PER_XMR;
    let mut frac = rem / STEP;
    if rem % STEP >= STEP / 2 {
        frac += 1;
    }
    if frac == 100_000_000 {
        whole += 1;
        frac = 0;
    }

    format!("{}.{:08}", whole, frac)
}

/// Formats how long ago `timestamp` was, relative to `now`
///
/// Uses coarse buckets: seconds under a minute, minutes under an hour,
/// hours under a day, days beyond. Timestamps in the future count as
/// zero seconds. An absent timestamp renders as [`NEVER`].
pub fn format_relative_time(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(timestamp) = timestamp else {
        return NEVER.to_string();
    };

    let secs = (now - timestamp).num_seconds().max(0);
    let (amount, unit) = match secs {
        s if s < 60 => (s, "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s => (s / 86_400, "day"),
    };

    if amount == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", amount, unit)
    }
}

/// Renders snapshots into chat payloads
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// Adds a "last share" column to the worker table
    pub show_last_share: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer {
            show_last_share: true,
        }
    }
}

impl Renderer {
    /// Creates a renderer
    pub fn new(show_last_share: bool) -> Self {
        Renderer { show_last_share }
    }

    /// Renders workers as a fixed-width table inside a code block
    ///
    /// The output has one header line, one separator line and one row per
    /// worker. If the table would exceed [`FIELD_VALUE_LIMIT`], trailing
    /// rows are replaced by a single "… and N more" line. An empty slice
    /// yields [`NO_WORKERS`].
    pub fn render_worker_table(&self, workers: &[WorkerStat], now: DateTime<Utc>) -> String {
        if workers.is_empty() {
            return NO_WORKERS.to_string();
        }

        let rows: Vec<String> = workers.iter().map(|w| self.worker_row(w, now)).collect();
        let mut lines = vec![self.header(), self.separator()];

        // Both fences with their newlines, plus the newline between header and separator
        let mut used = "```\n".len() + "\n```".len() + 1;
        used += lines.iter().map(|l| l.chars().count()).sum::<usize>();

        let mut shown = 0;
        for row in &rows {
            let hidden_after = rows.len() - shown - 1;
            let reserve = match hidden_after {
                0 => 0,
                n => overflow_line(n).chars().count() + 1,
            };
            let cost = row.chars().count() + 1;
            if used + cost + reserve > FIELD_VALUE_LIMIT {
                break;
            }
            used += cost;
            shown += 1;
        }

        lines.extend_from_slice(&rows[..shown]);
        if shown < rows.len() {
            // Header, separator and overflow line alone always fit
            lines.push(overflow_line(rows.len() - shown));
        }
        format!("```\n{}\n```", lines.join("\n"))
    }

    /// Composes the full status message for a snapshot
    pub fn render_summary(&self, snapshot: &StatsSnapshot, now: DateTime<Utc>) -> RenderedMessage {
        RenderedMessage {
            title: TITLE.to_string(),
            color: EMBED_COLOR,
            fields: vec![
                EmbedField {
                    name: BALANCE_FIELD.to_string(),
                    value: format!("**{} XMR**", format_balance(snapshot.confirmed_balance)),
                    inline: true,
                },
                EmbedField {
                    name: HASH_RATE_FIELD.to_string(),
                    value: format!("**{}**", format_hash_rate(snapshot.hash_rate)),
                    inline: true,
                },
                EmbedField {
                    name: SHARES_FIELD.to_string(),
                    value: format!("**{}**", snapshot.valid_shares),
                    inline: true,
                },
                EmbedField {
                    name: WORKERS_FIELD.to_string(),
                    value: self.render_worker_table(&snapshot.workers, now),
                    inline: false,
                },
            ],
        }
    }

    fn header(&self) -> String {
        let mut line = format!(
            "{:<NAME_WIDTH$} | {:<RATE_WIDTH$} | {:<SHARES_WIDTH$} | {:<STALE_WIDTH$}",
            "Worker", "Hash Rate", "Shares", "Stale"
        );
        if self.show_last_share {
            line.push_str(" | Last Share");
        }
        line.trim_end().to_string()
    }

    fn separator(&self) -> String {
        let mut widths = vec![NAME_WIDTH, RATE_WIDTH, SHARES_WIDTH, STALE_WIDTH];
        if self.show_last_share {
            widths.push("Last Share".len());
        }
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-")
    }

    fn worker_row(&self, worker: &WorkerStat, now: DateTime<Utc>) -> String {
        let name: String = worker.name.chars().take(NAME_WIDTH).collect();
        let mut line = format!(
            "{:<NAME_WIDTH$} | {:<RATE_WIDTH$} | {:<SHARES_WIDTH$} | {:<STALE_WIDTH$}",
            name,
            format_hash_rate(worker.hash_rate),
            worker.valid_shares,
            worker.stale_shares
        );
        if self.show_last_share {
            line.push_str(" | ");
            line.push_str(&format_relative_time(worker.last_share, now));
        }
        line.trim_end().to_string()
    }
}

fn overflow_line(hidden: usize) -> String {
    format!("… and {} more", hidden)
}
