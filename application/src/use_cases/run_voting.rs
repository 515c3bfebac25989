//! Run Voting use case
//!
//! Drives a single voting round: launch the workers, feed their votes to
//! the operation's strategy in arrival order, and stop as soon as the
//! strategy concludes.

use super::dispatch::WorkerDispatcher;
use crate::ports::progress::{NoProgress, VotingProgressNotifier};
use crate::ports::round_logger::{NoRoundLogger, RoundEvent, RoundLogger};
use crate::ports::worker::{TaskContext, VoteWorker};
use serde_json::json;
use std::sync::Arc;
use tally_domain::{
    AbstainReason, AggregationResult, ConfigError, OperationConfig, RoundState, StrategySnapshot,
    StrategyStep, Vote, strategy_for,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that end a round without a result
#[derive(Error, Debug)]
pub enum RunVotingError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Voting round is already {0}; an orchestrator runs a single round")]
    AlreadyRun(RoundState),
}

impl RunVotingError {
    pub fn is_config_error(&self) -> bool {
        matches!(self, RunVotingError::Config(_))
    }
}

/// Single-use state machine for one voting round
///
/// ```text
/// NotStarted ──launch──▶ Running ──vote──▶ Running ──decided / exhausted──▶ Terminated
///      └──invalid config──▶ Failed
/// ```
pub struct VotingOrchestrator {
    dispatcher: WorkerDispatcher,
    state: RoundState,
    round_logger: Arc<dyn RoundLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl VotingOrchestrator {
    pub fn new(worker: Arc<dyn VoteWorker>) -> Self {
        Self {
            dispatcher: WorkerDispatcher::new(worker),
            state: RoundState::NotStarted,
            round_logger: Arc::new(NoRoundLogger),
            cancellation_token: None,
        }
    }

    /// Record round events to a structured log
    pub fn with_round_logger(mut self, logger: Arc<dyn RoundLogger>) -> Self {
        self.round_logger = logger;
        self
    }

    /// Let the caller end the round early
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Run the round with default (no-op) progress
    pub async fn run(
        &mut self,
        config: Arc<OperationConfig>,
        context: TaskContext,
    ) -> Result<AggregationResult, RunVotingError> {
        self.run_with_progress(config, context, &NoProgress).await
    }

    /// Run the round with progress callbacks
    pub async fn run_with_progress(
        &mut self,
        config: Arc<OperationConfig>,
        context: TaskContext,
        progress: &dyn VotingProgressNotifier,
    ) -> Result<AggregationResult, RunVotingError> {
        if self.state != RoundState::NotStarted {
            return Err(RunVotingError::AlreadyRun(self.state.clone()));
        }

        let mut handle = match self.dispatcher.launch(Arc::clone(&config), context) {
            Ok(handle) => handle,
            Err(e) => {
                warn!("Voting round not started: {}", e);
                self.transition(RoundState::Failed(e.clone()));
                return Err(e.into());
            }
        };
        self.transition(RoundState::Running);

        let num_workers = config.num_workers();
        info!(
            "Starting voting round '{}' with {} workers ({})",
            config.name(),
            num_workers,
            config.strategy()
        );
        self.round_logger.log(RoundEvent::new(
            "round_start",
            json!({
                "operation": config.name(),
                "started_at": chrono::Utc::now().to_rfc3339(),
                "config": StrategySnapshot::from(config.as_ref()),
            }),
        ));
        progress.on_round_start(&config);

        let mut strategy = strategy_for(Arc::clone(&config));
        let mut votes: Vec<Vote> = Vec::with_capacity(num_workers);
        let mut concluded = None;
        let mut cancelled = false;

        // Collect votes with cancellation support
        loop {
            let next = if let Some(ref token) = self.cancellation_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        cancelled = true;
                        None
                    }
                    vote = handle.next_vote() => vote,
                }
            } else {
                handle.next_vote().await
            };

            let Some(vote) = next else {
                break;
            };

            match vote.abstain_reason {
                Some(reason) => debug!("Worker {} abstained ({})", vote.worker_index, reason),
                None => debug!("Worker {} voted: {}", vote.worker_index, vote.category),
            }
            self.round_logger.log(RoundEvent::new(
                "vote",
                json!({
                    "operation": config.name(),
                    "worker_index": vote.worker_index,
                    "category": vote.category.as_str(),
                    "abstain_reason": vote.abstain_reason,
                    "detail": vote.detail,
                    "received_at": vote.received_at,
                }),
            ));
            progress.on_vote(&vote);

            let step = strategy.accept(&vote);
            votes.push(vote);
            self.transition(RoundState::Running);

            if let StrategyStep::Decided(verdict) = step {
                concluded = Some(verdict);
                break;
            }
            if votes.len() >= num_workers {
                break;
            }
        }

        let outstanding = handle.outstanding();
        handle.cancel();
        let votes_collected = votes.len();

        if concluded.is_some() && !outstanding.is_empty() {
            info!(
                "Strategy concluded after {} of {} votes, cancelled {} workers",
                votes_collected,
                num_workers,
                outstanding.len()
            );
            progress.on_early_stop(outstanding.len());
        } else if !outstanding.is_empty() {
            let (reason, detail) = if cancelled {
                info!(
                    "Voting round cancelled with {} workers outstanding",
                    outstanding.len()
                );
                (AbstainReason::Cancelled, "round cancelled")
            } else {
                warn!(
                    "{} workers exited without reporting a vote",
                    outstanding.len()
                );
                (AbstainReason::WorkerFailed, "worker exited without a vote")
            };
            for worker_index in outstanding {
                let vote = Vote::abstain(worker_index, reason).with_detail(detail);
                strategy.accept(&vote);
                votes.push(vote);
            }
        }

        let verdict = concluded.unwrap_or_else(|| strategy.finalize());
        let mut result = AggregationResult::from_round(
            &config,
            strategy.tally(),
            verdict,
            votes,
            votes_collected,
        );
        if cancelled {
            result = result.into_cancelled();
        }

        self.transition(RoundState::Terminated(result.decision.clone()));
        info!(
            "Voting round '{}' finished: {} ({})",
            config.name(),
            result.decision,
            result.explain()
        );
        self.round_logger.log(RoundEvent::new(
            "round_complete",
            json!({
                "operation": config.name(),
                "decision": result.decision,
                "tally": result.tally,
                "votes_collected": result.votes_collected,
                "margin_achieved": result.margin_achieved,
                "early_stop": result.early_stop,
                "tie_broken": result.tie_broken,
                "cancelled": result.cancelled,
            }),
        ));
        progress.on_round_complete(&result);

        Ok(result)
    }

    fn transition(&mut self, next: RoundState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "illegal round transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
    }
}
