//! Aggregation strategies
//!
//! A strategy consumes votes one at a time, in completion order, and
//! either keeps waiting or concludes. Batch strategies (majority,
//! unanimous, weighted) only conclude in [`AggregationStrategy::finalize`];
//! first-to-ahead-by-k may conclude from [`AggregationStrategy::accept`],
//! which lets the round cancel the workers that are still running.
//!
//! A strategy instance holds the mutable tally for exactly one round and is
//! driven from a single consumer loop; it is `Send` but never shared.

mod ahead_by_k;
mod majority;
mod tie_break;
mod unanimous;
mod weighted;

pub use ahead_by_k::FirstToAheadByK;
pub use majority::Majority;
pub use unanimous::Unanimous;
pub use weighted::Weighted;

use crate::config::{OperationConfig, StrategyKind};
use crate::quorum::{Tally, Vote};
use crate::round::{AggregationResult, Decision};
use std::sync::Arc;

/// What a strategy concluded
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub decision: Decision,
    /// Lead of the top category over the runner-up
    pub margin: usize,
    /// The decision came from the tie-break policy
    pub tie_broken: bool,
    /// Concluded before every worker reported
    pub early_stop: bool,
}

impl Verdict {
    pub(crate) fn no_decision(tally: &Tally) -> Self {
        Self {
            decision: Decision::NoDecision,
            margin: tally.margin(),
            tie_broken: false,
            early_stop: false,
        }
    }
}

/// Result of feeding one vote to a strategy
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyStep {
    /// Keep collecting votes
    Pending,
    /// The round can end now
    Decided(Verdict),
}

impl StrategyStep {
    pub fn is_pending(&self) -> bool {
        matches!(self, StrategyStep::Pending)
    }
}

/// Common contract for every aggregation algorithm
pub trait AggregationStrategy: Send {
    fn kind(&self) -> StrategyKind;

    /// Tally one vote; may conclude the round for streaming strategies
    fn accept(&mut self, vote: &Vote) -> StrategyStep;

    /// Conclude from the votes accepted so far
    fn finalize(&self) -> Verdict;

    fn tally(&self) -> &Tally;

    /// Whether `accept` can conclude before all workers report
    fn is_streaming(&self) -> bool {
        self.kind().is_streaming()
    }
}

/// Build the strategy an operation selects
pub fn strategy_for(config: Arc<OperationConfig>) -> Box<dyn AggregationStrategy> {
    match config.strategy() {
        StrategyKind::Majority => Box::new(Majority::new(config)),
        StrategyKind::Unanimous => Box::new(Unanimous::new(config)),
        StrategyKind::FirstToAheadByK => Box::new(FirstToAheadByK::new(config)),
        StrategyKind::Weighted => Box::new(Weighted::new(config)),
    }
}

/// Aggregate an already-collected vote sequence, in the given order.
///
/// Streaming strategies stop at the first concluding vote; later votes are
/// not counted. At most `num_workers` votes are considered.
pub fn aggregate_votes(config: Arc<OperationConfig>, votes: Vec<Vote>) -> AggregationResult {
    let mut strategy = strategy_for(Arc::clone(&config));
    let mut used = Vec::with_capacity(votes.len());

    let mut concluded = None;
    for vote in votes.into_iter().take(config.num_workers()) {
        let step = strategy.accept(&vote);
        used.push(vote);
        if let StrategyStep::Decided(verdict) = step {
            concluded = Some(verdict);
            break;
        }
    }

    let verdict = concluded.unwrap_or_else(|| strategy.finalize());
    let collected = used.len();
    AggregationResult::from_round(&config, strategy.tally(), verdict, used, collected)
}

/// Plurality with tie-break, shared by majority and the ahead-by-k fallback
pub(crate) fn plurality_verdict(tally: &Tally, config: &OperationConfig) -> Verdict {
    if !meets_quorum(tally, config) {
        return Verdict::no_decision(tally);
    }

    let (decision, tie_broken) =
        tie_break::resolve(tally.leaders(), config.tie_break(), config.conservative_order());

    Verdict {
        decision,
        margin: tally.margin(),
        tie_broken,
        early_stop: false,
    }
}

/// At least one real vote, and at least `quorum` of them
pub(crate) fn meets_quorum(tally: &Tally, config: &OperationConfig) -> bool {
    let counted = tally.non_abstain_total();
    counted > 0 && counted >= config.quorum()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_strategy_for_matches_kind() {
        for kind in [
            StrategyKind::Majority,
            StrategyKind::Unanimous,
            StrategyKind::Weighted,
        ] {
            let config = Arc::new(
                OperationConfig::builder(kind, 2)
                    .weights(vec![1.0, 1.0])
                    .build()
                    .unwrap(),
            );
            let strategy = strategy_for(config);
            assert_eq!(strategy.kind(), kind);
            assert!(!strategy.is_streaming());
        }
        assert!(strategy_for(ahead_by(3, 2)).is_streaming());
    }

    #[test]
    fn test_aggregate_votes_stops_at_first_conclusion() {
        let result = aggregate_votes(
            ahead_by(5, 2),
            votes(&["approve", "reject", "approve", "approve", "reject"]),
        );
        assert_eq!(result.decision, Decision::decided("approve"));
        assert_eq!(result.votes_collected, 4);
        assert_eq!(result.votes.len(), 4);
        assert!(result.early_stop);
    }

    #[test]
    fn test_aggregate_votes_caps_at_num_workers() {
        let result = aggregate_votes(
            config(StrategyKind::Majority, 2),
            votes(&["reject", "approve", "approve", "approve"]),
        );
        assert_eq!(result.votes_collected, 2);
        assert_eq!(result.tally["approve"], 1);
        assert_eq!(result.tally["reject"], 1);
    }

    #[test]
    fn test_quorum_blocks_thin_decisions() {
        let config = Arc::new(
            OperationConfig::builder(StrategyKind::Majority, 4)
                .quorum(3)
                .build()
                .unwrap(),
        );
        let result = aggregate_votes(config, votes(&["approve", "approve", "abstain", "abstain"]));
        assert_eq!(result.decision, Decision::NoDecision);
        assert_eq!(result.tally["approve"], 2);
    }
}
