//! Application layer for tally
//!
//! This crate contains the voting use cases and the port definitions
//! adapters implement. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    progress::{NoProgress, VotingProgressNotifier},
    result_sink::{ResultSink, ResultSinkError},
    round_logger::{NoRoundLogger, RoundEvent, RoundLogger},
    worker::{TaskContext, VoteWorker, WorkerAssignment, WorkerError},
};
pub use use_cases::dispatch::{DispatchHandle, WorkerDispatcher};
pub use use_cases::invoke::{
    InvokeVotingInput, InvokeVotingUseCase, OperationRegistry, invoke_voting,
};
pub use use_cases::run_voting::{RunVotingError, VotingOrchestrator};
