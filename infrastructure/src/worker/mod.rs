//! Vote worker adapters

mod command;

pub use command::{CommandWorker, CommandWorkerError};
