//! Round lifecycle and result types

pub mod result;
pub mod state;

pub use result::{AggregationResult, Decision, StrategySnapshot};
pub use state::RoundState;
