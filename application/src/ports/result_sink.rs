//! Result sink port
//!
//! Where a finished [`AggregationResult`] goes once the round is over.

use tally_domain::AggregationResult;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultSinkError {
    #[error("Failed to write result to {path}: {message}")]
    Write { path: String, message: String },

    #[error("Failed to serialize result: {0}")]
    Serialize(String),
}

/// Destination for the result of a round
pub trait ResultSink: Send + Sync {
    fn emit(&self, result: &AggregationResult) -> Result<(), ResultSinkError>;
}
