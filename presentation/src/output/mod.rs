//! Result formatting for the console

pub mod console;
pub mod formatter;
