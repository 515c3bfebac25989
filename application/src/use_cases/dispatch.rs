//! Worker dispatch
//!
//! Launches the workers of a round in parallel and delivers their votes in
//! completion order through a single channel.
//!
//! Every worker slot resolves to exactly one vote: the worker's answer,
//! or an abstain when it fails, panics, times out or answers with
//! something that is not a usable category. Worker errors never escape
//! this module.

use crate::ports::worker::{TaskContext, VoteWorker, WorkerAssignment, WorkerError};
use futures::{FutureExt, Stream, StreamExt};
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tally_domain::{AbstainReason, Category, ConfigError, OperationConfig, Vote};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Launches one worker per index of an operation's schedule
pub struct WorkerDispatcher {
    worker: Arc<dyn VoteWorker>,
}

impl WorkerDispatcher {
    pub fn new(worker: Arc<dyn VoteWorker>) -> Self {
        Self { worker }
    }

    /// Launch `num_workers` workers and return the handle their votes
    /// arrive on.
    ///
    /// Configuration is checked before anything is spawned; on error no
    /// worker runs. Must be called from within a tokio runtime.
    pub fn launch(
        &self,
        config: Arc<OperationConfig>,
        context: TaskContext,
    ) -> Result<DispatchHandle, ConfigError> {
        let num_workers = config.num_workers();
        if num_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        let schedule = config.schedule();
        if schedule.len() < num_workers {
            return Err(ConfigError::ScheduleTooShort {
                len: schedule.len(),
                num_workers,
            });
        }

        let timeout = config.per_worker_timeout();
        let (tx, rx) = mpsc::channel(num_workers);
        let token = CancellationToken::new();
        let mut join_set = JoinSet::new();

        for worker_index in 0..num_workers {
            let assignment = WorkerAssignment {
                operation: config.name().to_string(),
                worker_index,
                sampling: schedule.get(worker_index).copied().unwrap_or_default(),
                model: config.model().map(str::to_string),
            };
            let worker = Arc::clone(&self.worker);
            let config = Arc::clone(&config);
            let context = context.clone();
            let token = token.clone();
            let tx = tx.clone();

            join_set.spawn(async move {
                let call = AssertUnwindSafe(worker.cast(&context, &assignment)).catch_unwind();

                let vote = tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    outcome = tokio::time::timeout(timeout, call) => match outcome {
                        Ok(Ok(output)) => vote_from_output(worker_index, output, &config),
                        Ok(Err(_)) => {
                            warn!("Worker {} panicked", worker_index);
                            Vote::abstain(worker_index, AbstainReason::WorkerFailed)
                                .with_detail("worker panicked")
                        }
                        Err(_) => {
                            warn!(
                                "Worker {} timed out after {}ms",
                                worker_index,
                                timeout.as_millis()
                            );
                            Vote::abstain(worker_index, AbstainReason::Timeout)
                                .with_detail(format!("no vote within {}ms", timeout.as_millis()))
                        }
                    },
                };

                // The receiver is gone once the round has concluded
                let _ = tx.send(vote).await;
            });
        }
        drop(tx);

        debug!(
            "Launched {} workers (timeout {}ms each)",
            num_workers,
            timeout.as_millis()
        );

        Ok(DispatchHandle {
            votes: rx,
            join_set,
            token,
            reported: vec![false; num_workers],
        })
    }
}

/// Turn a worker's raw answer into a vote.
///
/// Failures and unusable answers become abstains carrying the reason.
pub(crate) fn vote_from_output(
    worker_index: usize,
    output: Result<String, WorkerError>,
    config: &OperationConfig,
) -> Vote {
    let raw = match output {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Worker {} failed: {}", worker_index, e);
            return Vote::abstain(worker_index, AbstainReason::WorkerFailed)
                .with_detail(e.to_string());
        }
    };

    match Category::normalize(&raw) {
        None => {
            warn!("Worker {} returned empty output", worker_index);
            Vote::abstain(worker_index, AbstainReason::Malformed).with_detail("empty output")
        }
        Some(category) if !config.accepts_category(&category) => {
            warn!(
                "Worker {} answered '{}', which {} does not accept",
                worker_index,
                category,
                if config.name().is_empty() {
                    "this round"
                } else {
                    config.name()
                }
            );
            Vote::abstain(worker_index, AbstainReason::Malformed)
                .with_detail(format!("unexpected category '{}'", category))
        }
        Some(category) => Vote::cast(worker_index, category),
    }
}

/// Votes of one launched round, in completion order
///
/// Dropping the handle cancels every worker that is still running.
pub struct DispatchHandle {
    votes: mpsc::Receiver<Vote>,
    join_set: JoinSet<()>,
    token: CancellationToken,
    reported: Vec<bool>,
}

impl DispatchHandle {
    /// Next vote, or `None` once every worker reported or the round was
    /// cancelled. Cancel-safe.
    pub async fn next_vote(&mut self) -> Option<Vote> {
        self.next().await
    }

    /// Stop waiting for outstanding workers.
    ///
    /// Returns immediately; running workers are aborted at their next
    /// await point and no further votes are delivered.
    pub fn cancel(&mut self) {
        if self.token.is_cancelled() {
            return;
        }
        let outstanding = self.outstanding().len();
        if outstanding > 0 {
            debug!("Cancelling {} outstanding workers", outstanding);
        }
        self.token.cancel();
        self.join_set.abort_all();
        self.votes.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn num_workers(&self) -> usize {
        self.reported.len()
    }

    /// Number of votes delivered so far
    pub fn reported(&self) -> usize {
        self.reported.iter().filter(|r| **r).count()
    }

    /// Worker indices whose vote has not been delivered
    pub fn outstanding(&self) -> Vec<usize> {
        self.reported
            .iter()
            .enumerate()
            .filter(|(_, reported)| !**reported)
            .map(|(i, _)| i)
            .collect()
    }

    fn mark_reported(&mut self, vote: &Vote) {
        if let Some(slot) = self.reported.get_mut(vote.worker_index) {
            *slot = true;
        }
    }
}

impl Stream for DispatchHandle {
    type Item = Vote;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Vote>> {
        let this = self.get_mut();
        if this.token.is_cancelled() {
            return Poll::Ready(None);
        }
        match this.votes.poll_recv(cx) {
            Poll::Ready(Some(vote)) => {
                this.mark_reported(&vote);
                Poll::Ready(Some(vote))
            }
            other => other,
        }
    }
}

impl Drop for DispatchHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
