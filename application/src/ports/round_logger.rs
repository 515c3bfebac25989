//! Port for structured round logging.
//!
//! Defines the [`RoundLogger`] trait for recording round events
//! (round start, each vote, the final result) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! round transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured round event for logging.
pub struct RoundEvent {
    /// Event type identifier (e.g., "round_start", "vote", "round_complete").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl RoundEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging round events to a structured log.
///
/// `log` is synchronous and infallible; logging failures are ignored by
/// implementations.
pub trait RoundLogger: Send + Sync {
    fn log(&self, event: RoundEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoRoundLogger;

impl RoundLogger for NoRoundLogger {
    fn log(&self, _event: RoundEvent) {}
}
