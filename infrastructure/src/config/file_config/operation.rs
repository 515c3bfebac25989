//! Operation definitions from config (`[operations.<name>]` tables)
//!
//! Example configuration:
//!
//! ```toml
//! [operations.deploy_gate]
//! strategy = "first_to_ahead_by_k"
//! num_agents = 5
//! k = 2
//! model = "gpt-4.1"
//! timeout_per_worker = "30s"
//! allowed_categories = ["approve", "reject"]
//! ```
//!
//! The same shape is accepted from YAML:
//!
//! ```yaml
//! operations:
//!   deploy_gate:
//!     strategy: first_to_ahead_by_k
//!     num_agents: 5
//!     k: 2
//! ```

use super::duration::FileDuration;
use super::voting::FileVotingConfig;
use serde::{Deserialize, Serialize};
use tally_domain::{
    ConfigError, DecorrelationSchedule, OperationConfig, StrategyKind, TieBreakPolicy,
};

/// Raw operation definition, validated by [`Self::to_operation_config`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOperationConfig {
    /// "majority", "unanimous", "first_to_ahead_by_k" or "weighted"
    pub strategy: Option<String>,
    #[serde(alias = "num_workers")]
    pub num_agents: Option<usize>,
    /// Required iff strategy is first_to_ahead_by_k
    pub k: Option<usize>,
    /// Opaque model identifier forwarded to workers
    pub model: Option<String>,
    #[serde(alias = "timeout")]
    pub timeout_per_worker: Option<FileDuration>,
    /// "reject" or "favor_conservative_outcome"
    pub tie_break: Option<String>,
    pub conservative_order: Option<Vec<String>>,
    /// One temperature per worker; derived from `[voting]` when unset
    pub temperatures: Option<Vec<f64>>,
    pub weights: Option<Vec<f64>>,
    pub quorum: Option<usize>,
    pub allowed_categories: Option<Vec<String>>,
}

impl FileOperationConfig {
    pub fn parse_strategy(&self) -> Result<StrategyKind, ConfigError> {
        match &self.strategy {
            Some(s) => s.parse(),
            None => Ok(StrategyKind::default()),
        }
    }

    pub fn parse_tie_break(&self, voting: &FileVotingConfig) -> Result<TieBreakPolicy, ConfigError> {
        self.tie_break
            .as_deref()
            .unwrap_or(&voting.tie_break)
            .parse()
    }

    /// Build the validated domain config for this operation
    pub fn to_operation_config(
        &self,
        name: &str,
        voting: &FileVotingConfig,
    ) -> Result<OperationConfig, ConfigError> {
        let strategy = self.parse_strategy()?;
        let num_workers = self.num_agents.unwrap_or(0);

        let timeout = match &self.timeout_per_worker {
            Some(timeout) => timeout.to_duration()?,
            None => voting.default_timeout.to_duration()?,
        };

        let schedule = match &self.temperatures {
            Some(temperatures) => DecorrelationSchedule::from_temperatures(temperatures),
            None => DecorrelationSchedule::linear(
                num_workers,
                voting.temperature_min,
                voting.temperature_max,
            ),
        };

        let mut builder = OperationConfig::builder(strategy, num_workers)
            .name(name)
            .per_worker_timeout(timeout)
            .schedule(schedule)
            .tie_break(self.parse_tie_break(voting)?);

        if let Some(k) = self.k {
            builder = builder.k(k);
        }
        if let Some(model) = &self.model {
            builder = builder.model(model.clone());
        }
        if let Some(order) = &self.conservative_order {
            builder = builder.conservative_order(order.iter().map(String::as_str));
        }
        if let Some(weights) = &self.weights {
            builder = builder.weights(weights.clone());
        }
        if let Some(quorum) = self.quorum {
            builder = builder.quorum(quorum);
        }
        if let Some(categories) = &self.allowed_categories {
            builder = builder.allowed_categories(categories.iter().map(String::as_str));
        }

        builder.build()
    }
}
