//! Configuration value objects for the domain layer
//!
//! These are domain concepts related to configuration that are
//! used across multiple layers.

mod decorrelation;
mod operation;
mod output_format;
mod strategy_kind;
pub mod validation;

pub use crate::core::error::ConfigError;
pub use decorrelation::{DecorrelationSchedule, SamplingParams};
pub use operation::{
    DEFAULT_TEMPERATURE_RANGE, DEFAULT_WORKER_TIMEOUT, OperationConfig, OperationConfigBuilder,
};
pub use output_format::OutputFormat;
pub use strategy_kind::{StrategyKind, TieBreakPolicy};
