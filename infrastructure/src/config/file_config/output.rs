//! Output configuration (`[output]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tally_domain::OutputFormat;

// Re-export OutputFormat from domain for convenience
pub use tally_domain::OutputFormat as FileOutputFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Console format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Show a progress bar while workers run
    pub show_progress: bool,
    /// Directory for JSONL round logs
    pub log_dir: Option<PathBuf>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_progress: true,
            log_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_deserialize() {
        let toml_str = r#"
[output]
format = "json"
show_progress = false
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.show_progress);
        assert!(config.output.color);
    }
}
