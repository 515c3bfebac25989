//! Raw configuration data types
//!
//! These structs represent the exact structure of the config file (TOML or
//! YAML). They are deserialized directly and converted to validated domain
//! types on use.

mod duration;
mod operation;
mod output;
mod voting;
mod worker;

pub use duration::{FileDuration, parse_duration};
pub use operation::FileOperationConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use voting::FileVotingConfig;
pub use worker::FileWorkerConfig;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_application::OperationRegistry;
use tally_domain::{
    ConfigError, ConfigIssue, ConfigIssueCode, OperationConfig, StrategyKind, TieBreakPolicy,
};

/// Complete file configuration (raw structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Defaults shared by every operation
    pub voting: FileVotingConfig,
    /// Named critical operations
    pub operations: BTreeMap<String, FileOperationConfig>,
    /// External worker command
    pub worker: FileWorkerConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Every operation is checked independently so one broken operation
    /// does not hide problems in the others.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.operations.is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::NoOperations,
                "no [operations] are configured",
            ));
        }

        if let Err(e) = self.voting.tie_break.parse::<TieBreakPolicy>() {
            issues.push(enum_issue("voting.tie_break", &self.voting.tie_break, &e));
        }

        for (name, op) in &self.operations {
            match op.to_operation_config(name, &self.voting) {
                Ok(config) => {
                    if op.k.is_some() && !config.strategy().requires_k() {
                        issues.push(ConfigIssue::warning(
                            ConfigIssueCode::UnusedK {
                                operation: name.clone(),
                            },
                            format!(
                                "operations.{}: k is ignored by the {} strategy",
                                name,
                                config.strategy()
                            ),
                        ));
                    }
                    if op.weights.is_some() && !config.strategy().requires_weights() {
                        issues.push(ConfigIssue::warning(
                            ConfigIssueCode::UnusedWeights {
                                operation: name.clone(),
                            },
                            format!(
                                "operations.{}: weights are ignored by the {} strategy",
                                name,
                                config.strategy()
                            ),
                        ));
                    }
                }
                Err(e @ ConfigError::UnknownStrategy(_)) => {
                    let value = op.strategy.clone().unwrap_or_default();
                    issues.push(enum_issue(&format!("operations.{}.strategy", name), &value, &e));
                }
                Err(e @ ConfigError::UnknownTieBreak(_)) => {
                    // An inherited bad default is already reported under [voting]
                    if let Some(value) = &op.tie_break {
                        issues.push(enum_issue(
                            &format!("operations.{}.tie_break", name),
                            value,
                            &e,
                        ));
                    }
                }
                Err(e) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidOperation {
                        operation: name.clone(),
                        error: e.clone(),
                    },
                    format!("operations.{}: {}", name, e),
                )),
            }
        }

        issues
    }
}

impl OperationRegistry for FileConfig {
    fn operation(&self, name: &str) -> Result<OperationConfig, ConfigError> {
        let op = self
            .operations
            .get(name)
            .ok_or_else(|| ConfigError::UnknownOperation(name.to_string()))?;
        op.to_operation_config(name, &self.voting)
    }

    fn operation_names(&self) -> Vec<String> {
        self.operations.keys().cloned().collect()
    }
}

fn enum_issue(field: &str, value: &str, error: &ConfigError) -> ConfigIssue {
    let valid_values = match error {
        ConfigError::UnknownStrategy(_) => [
            StrategyKind::Majority,
            StrategyKind::Unanimous,
            StrategyKind::FirstToAheadByK,
            StrategyKind::Weighted,
        ]
        .iter()
        .map(|k| k.as_str().to_string())
        .collect(),
        _ => vec![
            TieBreakPolicy::Reject.to_string(),
            TieBreakPolicy::FavorConservativeOutcome.to_string(),
        ],
    };

    ConfigIssue::error(
        ConfigIssueCode::InvalidEnumValue {
            field: field.to_string(),
            value: value.to_string(),
            valid_values,
        },
        format!("{}: {}", field, error),
    )
}
