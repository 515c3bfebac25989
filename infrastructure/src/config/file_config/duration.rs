//! Durations as written in config files: `"30s"`, `"500ms"`, `"2m"` or a
//! bare number of seconds.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tally_domain::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileDuration {
    Seconds(u64),
    Text(String),
}

impl Default for FileDuration {
    fn default() -> Self {
        FileDuration::Seconds(60)
    }
}

impl FileDuration {
    pub fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            FileDuration::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            FileDuration::Text(text) => parse_duration(text),
        }
    }
}

impl From<Duration> for FileDuration {
    fn from(duration: Duration) -> Self {
        if duration.subsec_millis() == 0 {
            FileDuration::Seconds(duration.as_secs())
        } else {
            FileDuration::Text(format!("{}ms", duration.as_millis()))
        }
    }
}

/// Parse `<int><unit>` with unit one of `ms`, `s`, `m`, `h` (or none for
/// seconds).
pub fn parse_duration(text: &str) -> Result<Duration, ConfigError> {
    let trimmed = text.trim();
    let invalid = || ConfigError::InvalidDuration(text.to_string());

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let value: u64 = digits.parse().map_err(|_| invalid())?;

    match unit.trim() {
        "" | "s" | "sec" | "secs" => Ok(Duration::from_secs(value)),
        "ms" => Ok(Duration::from_millis(value)),
        "m" | "min" => value.checked_mul(60).map(Duration::from_secs).ok_or_else(invalid),
        "h" => value.checked_mul(3600).map(Duration::from_secs).ok_or_else(invalid),
        _ => Err(invalid()),
    }
}
