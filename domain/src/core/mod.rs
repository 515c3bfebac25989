//! Core domain concepts shared across all subdomains.
//!
//! - [`category::Category`] — a normalized vote outcome
//! - [`error::ConfigError`] — pre-flight configuration errors

pub mod category;
pub mod error;
