//! Progress notification port
//!
//! Defines the interface for reporting progress during a voting round.

use tally_domain::{AggregationResult, OperationConfig, Vote};

/// Callback for progress updates during a voting round
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (progress bars, plain lines, etc.)
pub trait VotingProgressNotifier: Send + Sync {
    /// Called once the workers have been launched
    fn on_round_start(&self, config: &OperationConfig);

    /// Called for each vote, in arrival order
    fn on_vote(&self, vote: &Vote);

    /// Called when the strategy concluded before every worker reported
    fn on_early_stop(&self, _outstanding: usize) {}

    /// Called with the final result
    fn on_round_complete(&self, result: &AggregationResult);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl VotingProgressNotifier for NoProgress {
    fn on_round_start(&self, _config: &OperationConfig) {}
    fn on_vote(&self, _vote: &Vote) {}
    fn on_round_complete(&self, _result: &AggregationResult) {}
}
