// src/publisher/mod.rs
//! Status message publishing
//!
//! - [`sink`] creates or edits the single status message
//! - [`scheduler`] runs the fetch → render → publish cycle on a timer

/// Create-or-edit message sink
pub mod sink;

/// Serialized publishing loop
///
/// Owns the status message handle and applies the error policies.
pub mod scheduler;

#[cfg(test)]
pub(crate) mod fakes;

// Re-export main components for cleaner imports
pub use self::scheduler::{
    CycleOutcome, ErrorReporting, MissingMessagePolicy, Scheduler, SchedulerState,
};
pub use self::sink::MessageSink;
