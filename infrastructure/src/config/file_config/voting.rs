//! Round defaults from config (`[voting]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [voting]
//! default_timeout = "60s"
//! temperature_min = 0.3
//! temperature_max = 1.0
//! tie_break = "reject"
//! ```

use super::duration::FileDuration;
use serde::{Deserialize, Serialize};
use tally_domain::DEFAULT_TEMPERATURE_RANGE;

/// Defaults applied to operations that leave a field unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVotingConfig {
    /// Per-worker timeout when an operation has no `timeout_per_worker`
    pub default_timeout: FileDuration,
    /// Lower end of the derived temperature schedule
    pub temperature_min: f64,
    /// Upper end of the derived temperature schedule
    pub temperature_max: f64,
    /// Tie-break policy when an operation has no `tie_break`
    pub tie_break: String,
}

impl Default for FileVotingConfig {
    fn default() -> Self {
        Self {
            default_timeout: FileDuration::default(),
            temperature_min: DEFAULT_TEMPERATURE_RANGE.0,
            temperature_max: DEFAULT_TEMPERATURE_RANGE.1,
            tie_break: "reject".to_string(),
        }
    }
}
