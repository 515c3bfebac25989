//! Structured configuration issues
//!
//! File-level validation collects every problem it finds instead of
//! stopping at the first one, so a user fixing a config file sees the
//! complete list in one pass.

use super::ConfigError;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the operation cannot run.
    Error,
    /// Non-fatal: the operation runs but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssueCode {
    /// The operation failed [`OperationConfig`](super::OperationConfig) validation.
    InvalidOperation {
        operation: String,
        error: ConfigError,
    },
    /// A field holds a value outside its accepted set.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// `k` was given for a strategy that ignores it.
    UnusedK { operation: String },
    /// `weights` were given for a strategy that ignores them.
    UnusedWeights { operation: String },
    /// No operations are configured.
    NoOperations,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let err = ConfigIssue::error(ConfigIssueCode::NoOperations, "none");
        assert!(err.is_error());

        let warn = ConfigIssue::warning(
            ConfigIssueCode::UnusedK {
                operation: "review".into(),
            },
            "k is ignored",
        );
        assert!(!warn.is_error());
        assert_eq!(warn.severity, Severity::Warning);
    }
}
