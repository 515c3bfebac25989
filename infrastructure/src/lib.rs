//! Infrastructure layer for tally
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration file loading, the external command
//! worker, JSONL round logs and result sinks.

pub mod config;
pub mod logging;
pub mod sink;
pub mod worker;

// Re-export commonly used types
pub use config::{
    ConfigLoadError, ConfigLoader, FileConfig, FileDuration, FileOperationConfig,
    FileOutputConfig, FileOutputFormat, FileVotingConfig, FileWorkerConfig, parse_duration,
};
pub use logging::JsonlRoundLogger;
pub use sink::JsonFileResultSink;
pub use worker::{CommandWorker, CommandWorkerError};
