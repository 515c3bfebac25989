//! Presentation layer for tally
//!
//! This crate contains CLI definitions, output formatters and progress
//! reporters.

pub mod cli;
pub mod config;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{AggregateArgs, Cli, Command, OutputFormat, RunArgs};
pub use config::{OutputConfig, ProgressMode};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress, progress_for};
