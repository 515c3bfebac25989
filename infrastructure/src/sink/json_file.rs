//! Write aggregation results to a JSON file

use std::path::{Path, PathBuf};
use tally_application::{ResultSink, ResultSinkError};
use tally_domain::AggregationResult;
use tracing::debug;

/// Writes each result as pretty-printed JSON, replacing the file
pub struct JsonFileResultSink {
    path: PathBuf,
}

impl JsonFileResultSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, e: std::io::Error) -> ResultSinkError {
        ResultSinkError::Write {
            path: self.path.display().to_string(),
            message: e.to_string(),
        }
    }
}

impl ResultSink for JsonFileResultSink {
    fn emit(&self, result: &AggregationResult) -> Result<(), ResultSinkError> {
        let json = serde_json::to_string_pretty(result)
            .map_err(|e| ResultSinkError::Serialize(e.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        std::fs::write(&self.path, json + "\n").map_err(|e| self.write_error(e))?;

        debug!("Wrote result for '{}' to {}", result.operation, self.path.display());
        Ok(())
    }
}
