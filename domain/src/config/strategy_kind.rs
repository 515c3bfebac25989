//! Aggregation strategy and tie-break selection
//!
//! Both enums parse from the snake_case names used in operation config
//! files (`first_to_ahead_by_k`, `favor_conservative_outcome`, ...).

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Which aggregation algorithm a round uses
///
/// # Example
///
/// ```
/// use tally_domain::StrategyKind;
///
/// let kind: StrategyKind = "first_to_ahead_by_k".parse().unwrap();
/// assert_eq!(kind, StrategyKind::FirstToAheadByK);
/// assert!(kind.is_streaming());
/// assert!(kind.requires_k());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Strict plurality of non-abstain votes after all workers report
    #[default]
    Majority,
    /// Every non-abstain vote must agree
    Unanimous,
    /// Stop as soon as one category leads all others by `k`
    #[serde(rename = "first_to_ahead_by_k")]
    FirstToAheadByK,
    /// Greatest summed per-worker weight after all workers report
    Weighted,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Majority => "majority",
            StrategyKind::Unanimous => "unanimous",
            StrategyKind::FirstToAheadByK => "first_to_ahead_by_k",
            StrategyKind::Weighted => "weighted",
        }
    }

    /// Whether the strategy may conclude before every worker reports
    pub fn is_streaming(&self) -> bool {
        matches!(self, StrategyKind::FirstToAheadByK)
    }

    pub fn requires_k(&self) -> bool {
        matches!(self, StrategyKind::FirstToAheadByK)
    }

    pub fn requires_weights(&self) -> bool {
        matches!(self, StrategyKind::Weighted)
    }

    /// Get a human-readable description of this strategy
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Majority => "majority (strict plurality)",
            StrategyKind::Unanimous => "unanimous (all non-abstain votes agree)",
            StrategyKind::FirstToAheadByK => "first-to-ahead-by-k (sequential early stop)",
            StrategyKind::Weighted => "weighted (greatest summed weight)",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "majority" => Ok(StrategyKind::Majority),
            "unanimous" => Ok(StrategyKind::Unanimous),
            "first_to_ahead_by_k" | "ahead_by_k" => Ok(StrategyKind::FirstToAheadByK),
            "weighted" => Ok(StrategyKind::Weighted),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}

/// What to do when the top categories are tied at round end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// Pick the tied category ranked first in the operation's conservative order;
    /// no decision if none of the tied categories is ranked
    FavorConservativeOutcome,
    /// Resolve the tie to the "reject" category
    #[default]
    Reject,
}

impl TieBreakPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TieBreakPolicy::FavorConservativeOutcome => "favor_conservative_outcome",
            TieBreakPolicy::Reject => "reject",
        }
    }
}

impl std::fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TieBreakPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reject" => Ok(TieBreakPolicy::Reject),
            "favor_conservative_outcome" | "conservative" => {
                Ok(TieBreakPolicy::FavorConservativeOutcome)
            }
            _ => Err(ConfigError::UnknownTieBreak(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert_eq!(
            "majority".parse::<StrategyKind>().ok(),
            Some(StrategyKind::Majority)
        );
        assert_eq!(
            "Unanimous".parse::<StrategyKind>().ok(),
            Some(StrategyKind::Unanimous)
        );
        assert_eq!(
            "first-to-ahead-by-k".parse::<StrategyKind>().ok(),
            Some(StrategyKind::FirstToAheadByK)
        );
        assert_eq!(
            "weighted".parse::<StrategyKind>().ok(),
            Some(StrategyKind::Weighted)
        );
    }

    #[test]
    fn test_parse_unknown_strategy() {
        let err = "plurality".parse::<StrategyKind>().unwrap_err();
        assert_eq!(err, ConfigError::UnknownStrategy("plurality".to_string()));
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&StrategyKind::FirstToAheadByK).unwrap();
        assert_eq!(json, "\"first_to_ahead_by_k\"");
        let kind: StrategyKind = serde_json::from_str("\"majority\"").unwrap();
        assert_eq!(kind, StrategyKind::Majority);
    }

    #[test]
    fn test_only_ahead_by_k_streams() {
        assert!(StrategyKind::FirstToAheadByK.is_streaming());
        assert!(!StrategyKind::Majority.is_streaming());
        assert!(!StrategyKind::Unanimous.is_streaming());
        assert!(!StrategyKind::Weighted.is_streaming());
    }

    #[test]
    fn test_parse_tie_break() {
        assert_eq!(
            "reject".parse::<TieBreakPolicy>().ok(),
            Some(TieBreakPolicy::Reject)
        );
        assert_eq!(
            "favor_conservative_outcome".parse::<TieBreakPolicy>().ok(),
            Some(TieBreakPolicy::FavorConservativeOutcome)
        );
        assert!("coin_flip".parse::<TieBreakPolicy>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(StrategyKind::default(), StrategyKind::Majority);
        assert_eq!(TieBreakPolicy::default(), TieBreakPolicy::Reject);
    }
}
