//! Operation configuration for a voting round
//!
//! An [`OperationConfig`] can only be obtained through
//! [`OperationConfigBuilder::build`], which enforces every cross-field
//! invariant. Holding one therefore means the round is launchable.

use super::decorrelation::DecorrelationSchedule;
use super::strategy_kind::{StrategyKind, TieBreakPolicy};
use crate::core::category::{Category, REJECT};
use crate::core::error::ConfigError;
use std::time::Duration;

/// Per-worker timeout used when none is configured
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(60);

/// Temperature range used to derive a schedule when none is configured
pub const DEFAULT_TEMPERATURE_RANGE: (f64, f64) = (0.3, 1.0);

/// Immutable, validated configuration for one voting round
#[derive(Debug, Clone, PartialEq)]
pub struct OperationConfig {
    name: String,
    strategy: StrategyKind,
    num_workers: usize,
    k: Option<usize>,
    per_worker_timeout: Duration,
    schedule: DecorrelationSchedule,
    tie_break: TieBreakPolicy,
    conservative_order: Vec<Category>,
    weights: Option<Vec<f64>>,
    quorum: usize,
    model: Option<String>,
    allowed_categories: Option<Vec<Category>>,
}

impl OperationConfig {
    /// Start building a config for `num_workers` workers
    ///
    /// # Example
    ///
    /// ```
    /// use tally_domain::{ConfigError, OperationConfig, StrategyKind};
    ///
    /// let config = OperationConfig::builder(StrategyKind::FirstToAheadByK, 5)
    ///     .k(2)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.k(), Some(2));
    ///
    /// let err = OperationConfig::builder(StrategyKind::FirstToAheadByK, 3)
    ///     .k(5)
    ///     .build()
    ///     .unwrap_err();
    /// assert!(matches!(err, ConfigError::KExceedsWorkers { k: 5, num_workers: 3 }));
    /// ```
    pub fn builder(strategy: StrategyKind, num_workers: usize) -> OperationConfigBuilder {
        OperationConfigBuilder::new(strategy, num_workers)
    }

    /// Operation name (empty for ad-hoc rounds)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn k(&self) -> Option<usize> {
        self.k
    }

    pub fn per_worker_timeout(&self) -> Duration {
        self.per_worker_timeout
    }

    pub fn schedule(&self) -> &DecorrelationSchedule {
        &self.schedule
    }

    pub fn tie_break(&self) -> TieBreakPolicy {
        self.tie_break
    }

    pub fn conservative_order(&self) -> &[Category] {
        &self.conservative_order
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    /// Weight of a worker's vote (1.0 when no weights are configured)
    pub fn weight_for(&self, worker_index: usize) -> f64 {
        self.weights
            .as_ref()
            .and_then(|w| w.get(worker_index).copied())
            .unwrap_or(1.0)
    }

    /// Minimum non-abstain votes before any decision is allowed
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn allowed_categories(&self) -> Option<&[Category]> {
        self.allowed_categories.as_deref()
    }

    /// Whether a worker answer is acceptable for this operation
    pub fn accepts_category(&self, category: &Category) -> bool {
        category.is_abstain()
            || self
                .allowed_categories
                .as_ref()
                .is_none_or(|allowed| allowed.contains(category))
    }
}

/// Builder for [`OperationConfig`]
#[derive(Debug, Clone)]
pub struct OperationConfigBuilder {
    name: String,
    strategy: StrategyKind,
    num_workers: usize,
    k: Option<usize>,
    per_worker_timeout: Duration,
    schedule: Option<DecorrelationSchedule>,
    tie_break: TieBreakPolicy,
    conservative_order: Vec<Category>,
    weights: Option<Vec<f64>>,
    quorum: usize,
    model: Option<String>,
    allowed_categories: Option<Vec<Category>>,
}

impl OperationConfigBuilder {
    pub fn new(strategy: StrategyKind, num_workers: usize) -> Self {
        Self {
            name: String::new(),
            strategy,
            num_workers,
            k: None,
            per_worker_timeout: DEFAULT_WORKER_TIMEOUT,
            schedule: None,
            tie_break: TieBreakPolicy::default(),
            conservative_order: vec![Category::new(REJECT)],
            weights: None,
            quorum: 1,
            model: None,
            allowed_categories: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn per_worker_timeout(mut self, timeout: Duration) -> Self {
        self.per_worker_timeout = timeout;
        self
    }

    pub fn schedule(mut self, schedule: DecorrelationSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn tie_break(mut self, policy: TieBreakPolicy) -> Self {
        self.tie_break = policy;
        self
    }

    pub fn conservative_order<I, C>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Category>,
    {
        self.conservative_order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn quorum(mut self, quorum: usize) -> Self {
        self.quorum = quorum;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn allowed_categories<I, C>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Category>,
    {
        self.allowed_categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Validate every invariant and produce the config
    pub fn build(self) -> Result<OperationConfig, ConfigError> {
        let n = self.num_workers;
        if n == 0 {
            return Err(ConfigError::NoWorkers);
        }

        if self.per_worker_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.strategy.requires_k() {
            let k = self.k.ok_or_else(|| ConfigError::MissingK {
                strategy: self.strategy.to_string(),
            })?;
            if k == 0 {
                return Err(ConfigError::ZeroK);
            }
            // k == n is reachable when every worker agrees
            if k > n {
                return Err(ConfigError::KExceedsWorkers { k, num_workers: n });
            }
        }

        let schedule = match self.schedule {
            Some(schedule) => {
                if schedule.len() < n {
                    return Err(ConfigError::ScheduleTooShort {
                        len: schedule.len(),
                        num_workers: n,
                    });
                }
                schedule
            }
            None => {
                let (min, max) = DEFAULT_TEMPERATURE_RANGE;
                DecorrelationSchedule::linear(n, min, max)
            }
        };

        match &self.weights {
            Some(weights) => {
                if weights.len() < n {
                    return Err(ConfigError::WeightsTooShort {
                        len: weights.len(),
                        num_workers: n,
                    });
                }
                if let Some((index, weight)) = weights
                    .iter()
                    .enumerate()
                    .find(|(_, w)| !w.is_finite() || **w < 0.0)
                {
                    return Err(ConfigError::InvalidWeight {
                        index,
                        weight: *weight,
                    });
                }
            }
            None if self.strategy.requires_weights() => return Err(ConfigError::MissingWeights),
            None => {}
        }

        if self.quorum > n {
            return Err(ConfigError::QuorumExceedsWorkers {
                quorum: self.quorum,
                num_workers: n,
            });
        }

        let named = self
            .conservative_order
            .iter()
            .chain(self.allowed_categories.iter().flatten());
        for category in named {
            if category.as_str().is_empty() || category.is_abstain() {
                return Err(ConfigError::InvalidCategory(category.to_string()));
            }
        }

        // Reject ties resolve to "reject", which must be a valid outcome
        if self.tie_break == TieBreakPolicy::Reject
            && let Some(allowed) = &self.allowed_categories
            && !allowed.iter().any(|c| c.as_str() == REJECT)
        {
            return Err(ConfigError::RejectNotAllowed);
        }

        Ok(OperationConfig {
            name: self.name,
            strategy: self.strategy,
            num_workers: n,
            k: self.k,
            per_worker_timeout: self.per_worker_timeout,
            schedule,
            tie_break: self.tie_break,
            conservative_order: self.conservative_order,
            weights: self.weights,
            quorum: self.quorum,
            model: self.model,
            allowed_categories: self.allowed_categories,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OperationConfig::builder(StrategyKind::Majority, 3)
            .build()
            .unwrap();
        assert_eq!(config.per_worker_timeout(), DEFAULT_WORKER_TIMEOUT);
        assert_eq!(config.schedule().len(), 3);
        assert_eq!(config.tie_break(), TieBreakPolicy::Reject);
        assert_eq!(config.quorum(), 1);
        assert_eq!(config.conservative_order(), &[Category::new("reject")]);
        assert!(config.name().is_empty());
    }

    #[test]
    fn test_zero_workers() {
        let err = OperationConfig::builder(StrategyKind::Majority, 0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::NoWorkers);
    }

    #[test]
    fn test_k_bounds() {
        let err = OperationConfig::builder(StrategyKind::FirstToAheadByK, 3)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingK { .. }));

        let err = OperationConfig::builder(StrategyKind::FirstToAheadByK, 3)
            .k(0)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroK);

        // k == num_workers is the largest reachable margin
        assert!(
            OperationConfig::builder(StrategyKind::FirstToAheadByK, 3)
                .k(3)
                .build()
                .is_ok()
        );

        let err = OperationConfig::builder(StrategyKind::FirstToAheadByK, 3)
            .k(4)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::KExceedsWorkers {
                k: 4,
                num_workers: 3
            }
        );
    }

    #[test]
    fn test_k_ignored_for_batch_strategies() {
        let config = OperationConfig::builder(StrategyKind::Majority, 3)
            .k(10)
            .build()
            .unwrap();
        assert_eq!(config.k(), Some(10));
    }

    #[test]
    fn test_schedule_too_short() {
        let err = OperationConfig::builder(StrategyKind::Majority, 3)
            .schedule(DecorrelationSchedule::from_temperatures(&[0.1, 0.2]))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::ScheduleTooShort {
                len: 2,
                num_workers: 3
            }
        );
    }

    #[test]
    fn test_zero_timeout() {
        let err = OperationConfig::builder(StrategyKind::Majority, 1)
            .per_worker_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroTimeout);
    }

    #[test]
    fn test_weighted_requires_weights() {
        let err = OperationConfig::builder(StrategyKind::Weighted, 2)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingWeights);

        let err = OperationConfig::builder(StrategyKind::Weighted, 2)
            .weights(vec![1.0])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::WeightsTooShort { .. }));

        let err = OperationConfig::builder(StrategyKind::Weighted, 2)
            .weights(vec![1.0, -0.5])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWeight { index: 1, .. }));

        let config = OperationConfig::builder(StrategyKind::Weighted, 2)
            .weights(vec![1.5, 0.5])
            .build()
            .unwrap();
        assert_eq!(config.weight_for(0), 1.5);
        assert_eq!(config.weight_for(7), 1.0);
    }

    #[test]
    fn test_quorum_bound() {
        let err = OperationConfig::builder(StrategyKind::Majority, 2)
            .quorum(3)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::QuorumExceedsWorkers { .. }));
    }

    #[test]
    fn test_abstain_cannot_be_configured_as_category() {
        let err = OperationConfig::builder(StrategyKind::Majority, 2)
            .allowed_categories(["approve", "abstain"])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidCategory("abstain".to_string()));

        let err = OperationConfig::builder(StrategyKind::Majority, 2)
            .conservative_order([""])
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCategory(_)));
    }

    #[test]
    fn test_reject_tie_break_needs_reject_category() {
        let err = OperationConfig::builder(StrategyKind::Majority, 2)
            .allowed_categories(["yes", "no"])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::RejectNotAllowed);

        let config = OperationConfig::builder(StrategyKind::Majority, 2)
            .allowed_categories(["yes", "no"])
            .tie_break(TieBreakPolicy::FavorConservativeOutcome)
            .conservative_order(["no"])
            .build()
            .unwrap();
        assert_eq!(config.tie_break(), TieBreakPolicy::FavorConservativeOutcome);
    }

    #[test]
    fn test_accepts_category() {
        let config = OperationConfig::builder(StrategyKind::Majority, 2)
            .allowed_categories(["approve", "reject"])
            .build()
            .unwrap();
        assert!(config.accepts_category(&Category::new("approve")));
        assert!(config.accepts_category(&Category::abstain()));
        assert!(!config.accepts_category(&Category::new("maybe")));

        let open = OperationConfig::builder(StrategyKind::Majority, 2)
            .build()
            .unwrap();
        assert!(open.accepts_category(&Category::new("maybe")));
    }
}
