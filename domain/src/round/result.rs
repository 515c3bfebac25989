//! Aggregation result value objects

use crate::config::{OperationConfig, StrategyKind, TieBreakPolicy};
use crate::core::category::Category;
use crate::quorum::{Tally, Vote};
use crate::strategy::Verdict;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terminal outcome of a round
///
/// Serializes as the category string, or `null` for no decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decision {
    Decided(Category),
    NoDecision,
}

impl Decision {
    pub fn decided(category: impl Into<Category>) -> Self {
        Decision::Decided(category.into())
    }

    pub fn is_decided(&self) -> bool {
        matches!(self, Decision::Decided(_))
    }

    pub fn category(&self) -> Option<&Category> {
        match self {
            Decision::Decided(c) => Some(c),
            Decision::NoDecision => None,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Decided(c) => write!(f, "{}", c),
            Decision::NoDecision => write!(f, "no decision"),
        }
    }
}

/// Echo of the configuration a round ran with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    pub strategy: StrategyKind,
    pub num_workers: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,
    pub tie_break: TieBreakPolicy,
    pub quorum: usize,
    pub per_worker_timeout_ms: u64,
}

impl From<&OperationConfig> for StrategySnapshot {
    fn from(config: &OperationConfig) -> Self {
        Self {
            strategy: config.strategy(),
            num_workers: config.num_workers(),
            k: config.k().filter(|_| config.strategy().requires_k()),
            tie_break: config.tie_break(),
            quorum: config.quorum(),
            per_worker_timeout_ms: config.per_worker_timeout().as_millis() as u64,
        }
    }
}

/// The single result every round terminates with
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tally_domain::{OperationConfig, StrategyKind, Vote, aggregate_votes};
///
/// let config = OperationConfig::builder(StrategyKind::Unanimous, 3).build().unwrap();
/// let votes = vec![
///     Vote::cast(0, "approve"),
///     Vote::cast(1, "approve"),
///     Vote::cast(2, "reject"),
/// ];
/// let result = aggregate_votes(Arc::new(config), votes);
///
/// assert!(!result.decision.is_decided());
/// assert_eq!(result.tally["approve"], 2);
/// assert_eq!(result.exit_code(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Operation name (empty for ad-hoc rounds)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub operation: String,
    pub decision: Decision,
    pub strategy_used: StrategySnapshot,
    /// Category → count, always including `abstain`
    pub tally: BTreeMap<String, usize>,
    /// Workers that actually returned a vote before the round concluded
    pub votes_collected: usize,
    /// Lead of the top category over the runner-up at termination
    pub margin_achieved: usize,
    /// Concluded before every worker reported
    pub early_stop: bool,
    /// The decision came from the tie-break policy
    pub tie_broken: bool,
    /// An external cancel ended the round
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_tally: Option<BTreeMap<String, f64>>,
    /// Votes used, in arrival order
    pub votes: Vec<Vote>,
}

impl AggregationResult {
    /// Assemble a result from a finished strategy
    pub fn from_round(
        config: &OperationConfig,
        tally: &Tally,
        verdict: Verdict,
        votes: Vec<Vote>,
        votes_collected: usize,
    ) -> Self {
        let weighted_tally = (config.strategy() == StrategyKind::Weighted).then(|| tally.weight_map());

        Self {
            operation: config.name().to_string(),
            decision: verdict.decision,
            strategy_used: StrategySnapshot::from(config),
            tally: tally.to_map(),
            votes_collected,
            margin_achieved: verdict.margin,
            early_stop: verdict.early_stop,
            tie_broken: verdict.tie_broken,
            cancelled: false,
            weighted_tally,
            votes,
        }
    }

    /// Mark the result as ended by an external cancel
    pub fn into_cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn abstain_count(&self) -> usize {
        self.tally.get(crate::core::category::ABSTAIN).copied().unwrap_or(0)
    }

    /// Process exit code: 0 for a decision, 1 for no decision
    pub fn exit_code(&self) -> i32 {
        if self.decision.is_decided() { 0 } else { 1 }
    }

    /// One-line tally explanation, e.g. "3 abstain, 1 approve, 1 reject"
    pub fn explain(&self) -> String {
        let mut parts: Vec<(usize, &str)> = self
            .tally
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(c, n)| (*n, c.as_str()))
            .collect();
        parts.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        if parts.is_empty() {
            return "no votes".to_string();
        }
        parts
            .iter()
            .map(|(n, c)| format!("{} {}", n, c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Visual vote summary in arrival order, e.g. "[AAR-]"
    ///
    /// Each vote shows the upper-cased first letter of its category;
    /// abstains show as `-`.
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            if vote.is_abstain() {
                summary.push('-');
            } else {
                let initial = vote.category.as_str().chars().next().unwrap_or('?');
                summary.extend(initial.to_uppercase());
            }
        }
        summary.push(']');
        summary
    }
}
