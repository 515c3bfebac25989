//! Progress display while workers run

pub mod reporter;
