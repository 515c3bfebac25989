//! Unanimous: every non-abstain vote must agree

use super::{AggregationStrategy, StrategyStep, Verdict, meets_quorum};
use crate::config::{OperationConfig, StrategyKind};
use crate::quorum::{Tally, Vote};
use crate::round::Decision;
use std::sync::Arc;

pub struct Unanimous {
    config: Arc<OperationConfig>,
    tally: Tally,
}

impl Unanimous {
    pub fn new(config: Arc<OperationConfig>) -> Self {
        Self {
            config,
            tally: Tally::new(),
        }
    }
}

impl AggregationStrategy for Unanimous {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Unanimous
    }

    fn accept(&mut self, vote: &Vote) -> StrategyStep {
        self.tally.record(vote);
        StrategyStep::Pending
    }

    fn finalize(&self) -> Verdict {
        // A single dissenter among non-abstain votes is enough to fail
        if !meets_quorum(&self.tally, &self.config) || self.tally.distinct_categories() != 1 {
            return Verdict::no_decision(&self.tally);
        }

        match self.tally.leaders().pop() {
            Some(category) => Verdict {
                decision: Decision::Decided(category),
                margin: self.tally.margin(),
                tie_broken: false,
                early_stop: false,
            },
            None => Verdict::no_decision(&self.tally),
        }
    }

    fn tally(&self) -> &Tally {
        &self.tally
    }
}
