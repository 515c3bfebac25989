//! Domain error types

use thiserror::Error;

/// Pre-flight configuration errors.
///
/// Raised while building an [`OperationConfig`](crate::config::OperationConfig)
/// or resolving an operation by name. A round that fails with one of these
/// never launches a worker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("num_workers must be at least 1")]
    NoWorkers,

    #[error("strategy '{strategy}' requires k")]
    MissingK { strategy: String },

    #[error("k must be at least 1")]
    ZeroK,

    #[error("k = {k} exceeds num_workers = {num_workers}; no margin of {k} is reachable")]
    KExceedsWorkers { k: usize, num_workers: usize },

    #[error("decorrelation schedule has {len} entries but {num_workers} workers are configured")]
    ScheduleTooShort { len: usize, num_workers: usize },

    #[error("per-worker timeout cannot be zero")]
    ZeroTimeout,

    #[error("invalid duration '{0}': expected e.g. \"30s\", \"500ms\", \"2m\" or whole seconds")]
    InvalidDuration(String),

    #[error("unknown strategy '{0}'. Valid: majority, unanimous, first_to_ahead_by_k, weighted")]
    UnknownStrategy(String),

    #[error("unknown tie-break policy '{0}'. Valid: reject, favor_conservative_outcome")]
    UnknownTieBreak(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("weighted strategy requires one weight per worker")]
    MissingWeights,

    #[error("{len} weights given for {num_workers} workers")]
    WeightsTooShort { len: usize, num_workers: usize },

    #[error("weight for worker {index} must be finite and non-negative, got {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("quorum = {quorum} exceeds num_workers = {num_workers}")]
    QuorumExceedsWorkers { quorum: usize, num_workers: usize },

    #[error("invalid category '{0}': categories must be non-empty and not 'abstain'")]
    InvalidCategory(String),

    #[error("tie-break policy 'reject' needs 'reject' in allowed_categories")]
    RejectNotAllowed,
}

impl ConfigError {
    /// Check if this error came from an unknown name lookup rather than a bad value
    pub fn is_unknown_name(&self) -> bool {
        matches!(
            self,
            ConfigError::UnknownStrategy(_)
                | ConfigError::UnknownTieBreak(_)
                | ConfigError::UnknownOperation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_exceeds_workers_display() {
        let error = ConfigError::KExceedsWorkers {
            k: 5,
            num_workers: 3,
        };
        assert_eq!(
            error.to_string(),
            "k = 5 exceeds num_workers = 3; no margin of 5 is reachable"
        );
    }

    #[test]
    fn test_is_unknown_name() {
        assert!(ConfigError::UnknownStrategy("plurality".into()).is_unknown_name());
        assert!(ConfigError::UnknownOperation("ship".into()).is_unknown_name());
        assert!(!ConfigError::NoWorkers.is_unknown_name());
        assert!(!ConfigError::ZeroTimeout.is_unknown_name());
    }
}
