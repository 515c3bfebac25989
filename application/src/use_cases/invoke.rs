//! Invoke Voting use case
//!
//! The entry point callers use for a critical operation: look the
//! operation up by name and run one voting round for it.

use super::run_voting::{RunVotingError, VotingOrchestrator};
use crate::ports::progress::{NoProgress, VotingProgressNotifier};
use crate::ports::round_logger::{NoRoundLogger, RoundLogger};
use crate::ports::worker::{TaskContext, VoteWorker};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tally_domain::{AggregationResult, ConfigError, OperationConfig};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Source of validated operation configurations
pub trait OperationRegistry: Send + Sync {
    /// Validated config for the named operation
    fn operation(&self, name: &str) -> Result<OperationConfig, ConfigError>;

    /// Names of every configured operation, sorted
    fn operation_names(&self) -> Vec<String>;
}

impl OperationRegistry for BTreeMap<String, OperationConfig> {
    fn operation(&self, name: &str) -> Result<OperationConfig, ConfigError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownOperation(name.to_string()))
    }

    fn operation_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Input for the InvokeVoting use case
#[derive(Debug, Clone)]
pub struct InvokeVotingInput {
    pub operation: String,
    /// Forwarded unchanged to every worker
    pub context: TaskContext,
}

impl InvokeVotingInput {
    pub fn new(operation: impl Into<String>, context: impl Into<TaskContext>) -> Self {
        Self {
            operation: operation.into(),
            context: context.into(),
        }
    }
}

/// Use case for running one voting round for a named operation
pub struct InvokeVotingUseCase {
    registry: Arc<dyn OperationRegistry>,
    worker: Arc<dyn VoteWorker>,
    round_logger: Arc<dyn RoundLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl InvokeVotingUseCase {
    pub fn new(registry: Arc<dyn OperationRegistry>, worker: Arc<dyn VoteWorker>) -> Self {
        Self {
            registry,
            worker,
            round_logger: Arc::new(NoRoundLogger),
            cancellation_token: None,
        }
    }

    pub fn with_round_logger(mut self, logger: Arc<dyn RoundLogger>) -> Self {
        self.round_logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: InvokeVotingInput,
    ) -> Result<AggregationResult, RunVotingError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: InvokeVotingInput,
        progress: &dyn VotingProgressNotifier,
    ) -> Result<AggregationResult, RunVotingError> {
        let config = self.registry.operation(&input.operation).map_err(|e| {
            warn!("Cannot run operation '{}': {}", input.operation, e);
            e
        })?;

        let mut orchestrator = VotingOrchestrator::new(Arc::clone(&self.worker))
            .with_round_logger(Arc::clone(&self.round_logger));
        if let Some(token) = &self.cancellation_token {
            orchestrator = orchestrator.with_cancellation(token.clone());
        }

        orchestrator
            .run_with_progress(Arc::new(config), input.context, progress)
            .await
    }
}

/// Run one voting round for `operation_name` with default logging and
/// progress.
pub async fn invoke_voting(
    registry: Arc<dyn OperationRegistry>,
    worker: Arc<dyn VoteWorker>,
    operation_name: &str,
    context: Value,
) -> Result<AggregationResult, RunVotingError> {
    InvokeVotingUseCase::new(registry, worker)
        .execute(InvokeVotingInput::new(operation_name, context))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::worker::{WorkerAssignment, WorkerError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tally_domain::{Decision, StrategyKind};

    struct EchoWorker {
        seen: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl VoteWorker for EchoWorker {
        async fn cast(
            &self,
            context: &TaskContext,
            _assignment: &WorkerAssignment,
        ) -> Result<String, WorkerError> {
            self.seen.lock().unwrap().push(context.value().clone());
            Ok(context.value()["answer"].as_str().unwrap_or("").to_string())
        }
    }

    fn registry() -> Arc<dyn OperationRegistry> {
        let mut operations = BTreeMap::new();
        operations.insert(
            "deploy_gate".to_string(),
            OperationConfig::builder(StrategyKind::Unanimous, 3)
                .name("deploy_gate")
                .build()
                .unwrap(),
        );
        Arc::new(operations)
    }

    #[tokio::test]
    async fn test_context_is_forwarded_unchanged() {
        let worker = Arc::new(EchoWorker {
            seen: Mutex::new(Vec::new()),
        });
        let context = json!({"answer": "approve", "diff": "+1 -1"});

        let result = invoke_voting(registry(), worker.clone(), "deploy_gate", context.clone())
            .await
            .unwrap();

        assert_eq!(result.decision, Decision::decided("approve"));
        assert_eq!(result.operation, "deploy_gate");
        let seen = worker.seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|v| *v == context));
    }

    #[tokio::test]
    async fn test_unknown_operation_is_config_error() {
        let worker = Arc::new(EchoWorker {
            seen: Mutex::new(Vec::new()),
        });
        let err = invoke_voting(registry(), worker.clone(), "nope", json!({}))
            .await
            .unwrap_err();

        assert!(err.is_config_error());
        assert!(matches!(
            err,
            RunVotingError::Config(ConfigError::UnknownOperation(ref name)) if name == "nope"
        ));
        assert!(worker.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_registry_lists_operations() {
        assert_eq!(registry().operation_names(), vec!["deploy_gate".to_string()]);
    }
}
