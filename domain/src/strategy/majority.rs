//! Majority: strict plurality after every worker reports

use super::{AggregationStrategy, StrategyStep, Verdict, plurality_verdict};
use crate::config::{OperationConfig, StrategyKind};
use crate::quorum::{Tally, Vote};
use std::sync::Arc;

pub struct Majority {
    config: Arc<OperationConfig>,
    tally: Tally,
}

impl Majority {
    pub fn new(config: Arc<OperationConfig>) -> Self {
        Self {
            config,
            tally: Tally::new(),
        }
    }
}

impl AggregationStrategy for Majority {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Majority
    }

    fn accept(&mut self, vote: &Vote) -> StrategyStep {
        self.tally.record(vote);
        StrategyStep::Pending
    }

    fn finalize(&self) -> Verdict {
        plurality_verdict(&self.tally, &self.config)
    }

    fn tally(&self) -> &Tally {
        &self.tally
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{config, votes};
    use super::*;
    use crate::config::TieBreakPolicy;
    use crate::round::Decision;

    fn run(config: Arc<OperationConfig>, categories: &[&str]) -> Verdict {
        let mut strategy = Majority::new(config);
        for vote in votes(categories) {
            assert!(strategy.accept(&vote).is_pending());
        }
        strategy.finalize()
    }

    #[test]
    fn test_strict_plurality_wins() {
        let verdict = run(
            config(StrategyKind::Majority, 5),
            &["approve", "reject", "approve", "defer", "approve"],
        );
        assert_eq!(verdict.decision, Decision::decided("approve"));
        assert_eq!(verdict.margin, 2);
        assert!(!verdict.tie_broken);
    }

    #[test]
    fn test_plurality_without_absolute_majority() {
        let verdict = run(
            config(StrategyKind::Majority, 5),
            &["blue", "blue", "green", "red", "abstain"],
        );
        assert_eq!(verdict.decision, Decision::decided("blue"));
    }

    #[test]
    fn test_abstains_do_not_win() {
        let verdict = run(
            config(StrategyKind::Majority, 4),
            &["abstain", "abstain", "abstain", "reject"],
        );
        assert_eq!(verdict.decision, Decision::decided("reject"));
    }

    #[test]
    fn test_all_abstain_is_no_decision() {
        let verdict = run(config(StrategyKind::Majority, 2), &["abstain", "abstain"]);
        assert_eq!(verdict.decision, Decision::NoDecision);
    }

    #[test]
    fn test_tie_with_reject_policy() {
        let verdict = run(
            config(StrategyKind::Majority, 4),
            &["abstain", "abstain", "approve", "reject"],
        );
        assert_eq!(verdict.decision, Decision::decided("reject"));
        assert!(verdict.tie_broken);
        assert_eq!(verdict.margin, 0);
    }

    #[test]
    fn test_tie_with_conservative_policy_and_no_ranked_category() {
        let config = Arc::new(
            OperationConfig::builder(StrategyKind::Majority, 2)
                .tie_break(TieBreakPolicy::FavorConservativeOutcome)
                .conservative_order(["reject"])
                .build()
                .unwrap(),
        );
        let verdict = run(config, &["blue", "green"]);
        assert_eq!(verdict.decision, Decision::NoDecision);
    }
}
