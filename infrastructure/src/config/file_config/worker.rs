//! Worker adapter configuration (`[worker]` section)
//!
//! ```toml
//! [worker]
//! command = ["./scripts/vote.sh", "--fast"]
//! working_dir = "."
//!
//! [worker.env]
//! OPENAI_BASE_URL = "http://localhost:8080"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkerConfig {
    /// Program and arguments run once per vote
    pub command: Vec<String>,
    /// Working directory for the worker process
    pub working_dir: Option<PathBuf>,
    /// Extra environment for the worker process
    pub env: BTreeMap<String, String>,
}

impl FileWorkerConfig {
    pub fn is_configured(&self) -> bool {
        !self.command.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_worker_deserialize() {
        let toml_str = r#"
[worker]
command = ["python3", "vote.py"]

[worker.env]
MODEL_HOST = "local"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.worker.is_configured());
        assert_eq!(config.worker.command, vec!["python3", "vote.py"]);
        assert_eq!(config.worker.env["MODEL_HOST"], "local");
        assert!(config.worker.working_dir.is_none());
    }
}
