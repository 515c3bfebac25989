//! Weighted: greatest summed per-worker weight after every worker reports

use super::{AggregationStrategy, StrategyStep, Verdict, meets_quorum, tie_break};
use crate::config::{OperationConfig, StrategyKind};
use crate::quorum::{Tally, Vote};
use std::sync::Arc;

pub struct Weighted {
    config: Arc<OperationConfig>,
    tally: Tally,
}

impl Weighted {
    pub fn new(config: Arc<OperationConfig>) -> Self {
        Self {
            config,
            tally: Tally::new(),
        }
    }
}

impl AggregationStrategy for Weighted {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Weighted
    }

    fn accept(&mut self, vote: &Vote) -> StrategyStep {
        let weight = self.config.weight_for(vote.worker_index);
        self.tally.record_weighted(vote, weight);
        StrategyStep::Pending
    }

    fn finalize(&self) -> Verdict {
        if !meets_quorum(&self.tally, &self.config) || self.tally.total_weight() <= 0.0 {
            return Verdict::no_decision(&self.tally);
        }

        let (decision, tie_broken) = tie_break::resolve(
            self.tally.weight_leaders(),
            self.config.tie_break(),
            self.config.conservative_order(),
        );

        Verdict {
            decision,
            margin: self.tally.margin(),
            tie_broken,
            early_stop: false,
        }
    }

    fn tally(&self) -> &Tally {
        &self.tally
    }
}
