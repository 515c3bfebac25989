//! Vote primitives
//!
//! A round produces one [`Vote`] per worker. Votes are folded into a
//! [`Tally`] by whichever aggregation strategy the operation selects.
//!
//! ```text
//!  worker 0 ─┐
//!  worker 1 ─┼─▶ Vote (completion order) ─▶ Tally ─▶ Strategy ─▶ Verdict
//!  worker N ─┘
//! ```

pub mod tally;
pub mod vote;

pub use tally::Tally;
pub use vote::{AbstainReason, Vote};
