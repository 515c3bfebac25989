//! First-to-ahead-by-k: sequential early stopping
//!
//! Votes are counted in arrival order. After each non-abstain vote the
//! lead of the top category over the runner-up is checked; the first time
//! it reaches `k` the round concludes. This is the stopping boundary of a
//! sequential probability ratio test: confident rounds finish after a few
//! votes instead of waiting for all N workers.
//!
//! If every worker reports without any category getting `k` ahead, the
//! round falls back to the same tie-break-aware plurality as majority.

use super::{AggregationStrategy, StrategyStep, Verdict, meets_quorum, plurality_verdict};
use crate::config::{OperationConfig, StrategyKind};
use crate::quorum::{Tally, Vote};
use crate::round::Decision;
use std::sync::Arc;

pub struct FirstToAheadByK {
    config: Arc<OperationConfig>,
    k: usize,
    tally: Tally,
    concluded: Option<Verdict>,
}

impl FirstToAheadByK {
    pub fn new(config: Arc<OperationConfig>) -> Self {
        // OperationConfig guarantees k is present and within 1..=num_workers
        let k = config.k().unwrap_or(1);
        Self {
            config,
            k,
            tally: Tally::new(),
            concluded: None,
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// The verdict reached during streaming, if any
    pub fn concluded(&self) -> Option<&Verdict> {
        self.concluded.as_ref()
    }

    fn check_margin(&self) -> Option<Verdict> {
        let margin = self.tally.margin();
        if margin < self.k || !meets_quorum(&self.tally, &self.config) {
            return None;
        }

        // margin >= k >= 1 means the leader is unique
        let leader = self.tally.ranked().first().map(|(c, _)| (*c).clone())?;
        Some(Verdict {
            decision: Decision::Decided(leader),
            margin,
            tie_broken: false,
            early_stop: self.tally.total() < self.config.num_workers(),
        })
    }
}

impl AggregationStrategy for FirstToAheadByK {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FirstToAheadByK
    }

    fn accept(&mut self, vote: &Vote) -> StrategyStep {
        if let Some(verdict) = &self.concluded {
            return StrategyStep::Decided(verdict.clone());
        }

        self.tally.record(vote);
        if vote.is_abstain() {
            return StrategyStep::Pending;
        }

        match self.check_margin() {
            Some(verdict) => {
                self.concluded = Some(verdict.clone());
                StrategyStep::Decided(verdict)
            }
            None => StrategyStep::Pending,
        }
    }

    fn finalize(&self) -> Verdict {
        match &self.concluded {
            Some(verdict) => verdict.clone(),
            None => plurality_verdict(&self.tally, &self.config),
        }
    }

    fn tally(&self) -> &Tally {
        &self.tally
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ahead_by, votes};
    use super::*;
    use crate::config::TieBreakPolicy;

    /// Feed votes until the strategy concludes; returns the 1-based stop index
    fn stop_index(strategy: &mut FirstToAheadByK, categories: &[&str]) -> Option<usize> {
        for (i, vote) in votes(categories).iter().enumerate() {
            if let StrategyStep::Decided(_) = strategy.accept(vote) {
                return Some(i + 1);
            }
        }
        None
    }

    #[test]
    fn test_stops_once_k_ahead() {
        let mut strategy = FirstToAheadByK::new(ahead_by(5, 2));
        let stop = stop_index(&mut strategy, &["approve", "reject", "approve", "approve"]);
        assert_eq!(stop, Some(4));

        let verdict = strategy.finalize();
        assert_eq!(verdict.decision, Decision::decided("approve"));
        assert_eq!(verdict.margin, 2);
        assert!(verdict.early_stop);
    }

    #[test]
    fn test_stops_at_first_reaching_index_not_later() {
        let mut strategy = FirstToAheadByK::new(ahead_by(5, 2));
        let stop = stop_index(&mut strategy, &["approve", "approve", "reject", "approve"]);
        assert_eq!(stop, Some(2));
        assert_eq!(strategy.tally().total(), 2);
    }

    #[test]
    fn test_never_stops_below_threshold() {
        let sequences: &[&[&str]] = &[
            &["approve", "reject", "approve", "reject", "approve", "reject"],
            &["a", "b", "c", "a", "b", "c"],
            &["approve", "abstain", "abstain", "reject"],
        ];
        for seq in sequences {
            let mut strategy = FirstToAheadByK::new(ahead_by(seq.len(), 2));
            for vote in votes(seq) {
                let step = strategy.accept(&vote);
                if let StrategyStep::Decided(verdict) = step {
                    assert!(verdict.margin >= 2, "concluded below k on {:?}", seq);
                }
            }
        }
    }

    #[test]
    fn test_margin_is_against_runner_up() {
        // a ends 2 ahead of b but only 1 ahead of c
        let mut strategy = FirstToAheadByK::new(ahead_by(6, 2));
        assert_eq!(
            stop_index(&mut strategy, &["a", "c", "a", "c", "a", "b"]),
            None
        );
        assert_eq!(strategy.tally().margin(), 1);
    }

    #[test]
    fn test_abstains_never_move_the_margin() {
        let mut strategy = FirstToAheadByK::new(ahead_by(5, 2));
        let stop = stop_index(
            &mut strategy,
            &["approve", "abstain", "abstain", "abstain", "approve"],
        );
        assert_eq!(stop, Some(5));
        let verdict = strategy.finalize();
        assert!(!verdict.early_stop, "all five workers reported");
        assert_eq!(strategy.tally().abstain_count(), 3);
    }

    #[test]
    fn test_k_equal_to_workers_requires_full_agreement() {
        let mut strategy = FirstToAheadByK::new(ahead_by(3, 3));
        assert_eq!(stop_index(&mut strategy, &["approve", "approve", "approve"]), Some(3));

        let mut strategy = FirstToAheadByK::new(ahead_by(3, 3));
        assert_eq!(stop_index(&mut strategy, &["approve", "approve", "reject"]), None);
    }

    #[test]
    fn test_exhaustion_falls_back_to_plurality() {
        let mut strategy = FirstToAheadByK::new(ahead_by(4, 3));
        assert_eq!(
            stop_index(&mut strategy, &["approve", "reject", "approve", "abstain"]),
            None
        );
        let verdict = strategy.finalize();
        assert_eq!(verdict.decision, Decision::decided("approve"));
        assert_eq!(verdict.margin, 1);
        assert!(!verdict.early_stop);
    }

    #[test]
    fn test_exhaustion_tie_uses_policy() {
        let config = Arc::new(
            OperationConfig::builder(StrategyKind::FirstToAheadByK, 2)
                .k(2)
                .tie_break(TieBreakPolicy::FavorConservativeOutcome)
                .conservative_order(["defer"])
                .build()
                .unwrap(),
        );
        let mut strategy = FirstToAheadByK::new(config);
        assert_eq!(stop_index(&mut strategy, &["approve", "defer"]), None);
        let verdict = strategy.finalize();
        assert_eq!(verdict.decision, Decision::decided("defer"));
        assert!(verdict.tie_broken);
    }

    #[test]
    fn test_exhaustion_all_abstain() {
        let mut strategy = FirstToAheadByK::new(ahead_by(2, 1));
        assert_eq!(stop_index(&mut strategy, &["abstain", "abstain"]), None);
        assert_eq!(strategy.finalize().decision, Decision::NoDecision);
    }

    #[test]
    fn test_votes_after_conclusion_are_ignored() {
        let mut strategy = FirstToAheadByK::new(ahead_by(5, 1));
        assert_eq!(stop_index(&mut strategy, &["reject"]), Some(1));

        let step = strategy.accept(&Vote::cast(1, "approve"));
        assert!(matches!(step, StrategyStep::Decided(v) if v.decision == Decision::decided("reject")));
        assert_eq!(strategy.tally().total(), 1);
    }

    #[test]
    fn test_quorum_delays_early_stop() {
        let config = Arc::new(
            OperationConfig::builder(StrategyKind::FirstToAheadByK, 5)
                .k(1)
                .quorum(3)
                .build()
                .unwrap(),
        );
        let mut strategy = FirstToAheadByK::new(config);
        assert_eq!(
            stop_index(&mut strategy, &["approve", "approve", "approve"]),
            Some(3)
        );
    }
}
