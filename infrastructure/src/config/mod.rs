//! Configuration file loading for tally
//!
//! This module handles file I/O and merging of configuration from multiple
//! sources. The priority order (highest to lowest):
//!
//! 1. `TALLY_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./tally.toml`, `./tally.yaml` or `./tally.yml`
//! 4. Global: `$XDG_CONFIG_HOME/tally/config.{toml,yaml,yml}`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileDuration, FileOperationConfig, FileOutputConfig, FileOutputFormat,
    FileVotingConfig, FileWorkerConfig, parse_duration,
};
pub use loader::{ConfigLoadError, ConfigLoader};
