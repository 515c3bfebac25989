//! Vote types for a voting round
//!
//! This module defines the single-worker outcome that every aggregation
//! strategy consumes.

use crate::core::category::Category;
use serde::{Deserialize, Serialize};

/// Why a worker's slot resolved to `abstain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstainReason {
    /// The worker explicitly answered "abstain"
    Declined,
    /// The per-worker timer expired
    Timeout,
    /// The worker callback returned an error or panicked
    WorkerFailed,
    /// The worker produced empty or unrecognized output
    Malformed,
    /// The round was cancelled before the worker reported
    Cancelled,
}

impl std::fmt::Display for AbstainReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AbstainReason::Declined => "declined",
            AbstainReason::Timeout => "timeout",
            AbstainReason::WorkerFailed => "worker failed",
            AbstainReason::Malformed => "malformed output",
            AbstainReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A single worker's outcome for one voting round
///
/// # Example
///
/// ```
/// use tally_domain::{AbstainReason, Vote};
///
/// let vote = Vote::cast(0, "approve");
/// assert!(!vote.is_abstain());
///
/// let timed_out = Vote::abstain(2, AbstainReason::Timeout);
/// assert!(timed_out.is_abstain());
/// assert_eq!(timed_out.abstain_reason, Some(AbstainReason::Timeout));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vote {
    /// 0-based worker identity, unique within a round
    pub worker_index: usize,
    /// Outcome category
    pub category: Category,
    /// Arrival time (milliseconds since epoch), used only for ordering
    pub received_at: u64,
    /// Set when `category` is abstain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstain_reason: Option<AbstainReason>,
    /// Error text or raw output that led to an abstain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Vote {
    /// Create a vote for a category, stamped with the current time.
    ///
    /// A category of "abstain" produces a [`AbstainReason::Declined`] abstain.
    pub fn cast(worker_index: usize, category: impl Into<Category>) -> Self {
        let category = category.into();
        let abstain_reason = category.is_abstain().then_some(AbstainReason::Declined);
        Self {
            worker_index,
            category,
            received_at: current_timestamp(),
            abstain_reason,
            detail: None,
        }
    }

    /// Create an abstain vote
    pub fn abstain(worker_index: usize, reason: AbstainReason) -> Self {
        Self {
            worker_index,
            category: Category::abstain(),
            received_at: current_timestamp(),
            abstain_reason: Some(reason),
            detail: None,
        }
    }

    /// Attach detail text (error message or rejected raw output)
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Override the arrival timestamp
    pub fn with_received_at(mut self, received_at: u64) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn is_abstain(&self) -> bool {
        self.category.is_abstain()
    }
}

/// Get current timestamp in milliseconds
pub(crate) fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_normalizes_category() {
        let vote = Vote::cast(1, "  APPROVE ");
        assert_eq!(vote.category.as_str(), "approve");
        assert!(vote.abstain_reason.is_none());
        assert!(vote.received_at > 0);
    }

    #[test]
    fn test_explicit_abstain_is_declined() {
        let vote = Vote::cast(0, "abstain");
        assert!(vote.is_abstain());
        assert_eq!(vote.abstain_reason, Some(AbstainReason::Declined));
    }

    #[test]
    fn test_abstain_with_detail() {
        let vote = Vote::abstain(3, AbstainReason::WorkerFailed).with_detail("connection reset");
        assert!(vote.is_abstain());
        assert_eq!(vote.detail.as_deref(), Some("connection reset"));
    }

    #[test]
    fn test_serialize_skips_empty_reason() {
        let vote = Vote::cast(0, "reject").with_received_at(42);
        let json = serde_json::to_value(&vote).unwrap();
        assert_eq!(json["category"], "reject");
        assert_eq!(json["received_at"], 42);
        assert!(json.get("abstain_reason").is_none());
    }

    #[test]
    fn test_abstain_reason_display() {
        assert_eq!(AbstainReason::Timeout.to_string(), "timeout");
        assert_eq!(AbstainReason::Malformed.to_string(), "malformed output");
    }
}
