//! Result sinks: destinations for finished rounds

mod json_file;

pub use json_file::JsonFileResultSink;
