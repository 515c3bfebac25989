//! Vote worker port
//!
//! Defines the interface for the computation behind a single vote.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tally_domain::SamplingParams;
use thiserror::Error;

/// Errors a worker can report for one vote
///
/// The dispatcher turns every one of these into an abstain vote; they
/// never fail a round.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to start worker: {0}")]
    Spawn(String),

    #[error("Worker exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Worker failed: {0}")]
    Failed(String),
}

/// Opaque task context, forwarded unchanged to every worker
#[derive(Debug, Clone, Default)]
pub struct TaskContext(Arc<Value>);

impl TaskContext {
    pub fn new(value: Value) -> Self {
        Self(Arc::new(value))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for TaskContext {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Per-worker parameters for one round
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerAssignment {
    /// Operation the round belongs to (empty for ad-hoc rounds)
    pub operation: String,
    pub worker_index: usize,
    /// Decorrelation parameters for this worker
    pub sampling: SamplingParams,
    /// Opaque model identifier from the operation config
    pub model: Option<String>,
}

/// Computation behind one vote
///
/// Implementations return the worker's raw answer; normalization into a
/// category happens in the dispatcher.
#[async_trait]
pub trait VoteWorker: Send + Sync {
    async fn cast(
        &self,
        context: &TaskContext,
        assignment: &WorkerAssignment,
    ) -> Result<String, WorkerError>;
}
