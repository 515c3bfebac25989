//! Domain layer for tally
//!
//! This crate contains the voting rules: categories, votes, tallies, the
//! aggregation strategies and the per-operation configuration they read.
//! It has no dependencies on async runtimes, processes or files.
//!
//! # Core Concepts
//!
//! ## Voting round
//!
//! One invocation of a critical operation fans out to N independent
//! workers. Each worker returns a single categorical [`Vote`]; failed,
//! late or malformed workers become abstains. An [`AggregationStrategy`]
//! folds the votes into a [`Decision`].
//!
//! ## Strategies
//!
//! - **Majority**: strict plurality once every worker reports
//! - **Unanimous**: every non-abstain vote must agree
//! - **FirstToAheadByK**: stop as soon as one category leads by `k`
//! - **Weighted**: per-worker weights, greatest summed weight wins

pub mod config;
pub mod core;
pub mod quorum;
pub mod round;
pub mod strategy;

pub use config::{
    DEFAULT_TEMPERATURE_RANGE, DEFAULT_WORKER_TIMEOUT, DecorrelationSchedule, OperationConfig,
    OperationConfigBuilder, OutputFormat, SamplingParams, StrategyKind, TieBreakPolicy,
    validation::{ConfigIssue, ConfigIssueCode, Severity},
};
pub use core::{
    category::{ABSTAIN, Category, REJECT},
    error::ConfigError,
};
pub use quorum::{AbstainReason, Tally, Vote};
pub use round::{AggregationResult, Decision, RoundState, StrategySnapshot};
pub use strategy::{
    AggregationStrategy, FirstToAheadByK, Majority, StrategyStep, Unanimous, Verdict, Weighted,
    aggregate_votes, strategy_for,
};
