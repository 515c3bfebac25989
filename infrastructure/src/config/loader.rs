//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "tally";
const ENV_PREFIX: &str = "TALLY_";
const PROJECT_FILES: &[&str] = &["tally.toml", "tally.yaml", "tally.yml", ".tally.toml"];
const GLOBAL_FILES: &[&str] = &["config.toml", "config.yaml", "config.yml"];

/// Errors raised while loading configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error(transparent)]
    Figment(#[from] Box<figment::Error>),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TALLY_*` environment variables (`__` separates nested keys,
    ///    e.g. `TALLY_OUTPUT__FORMAT=json`)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./tally.toml`, `./tally.yaml` or `./tally.yml`
    /// 4. Global: `$XDG_CONFIG_HOME/tally/config.{toml,yaml,yml}`
    /// 5. Default values
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigLoadError> {
        Self::load_layers(
            Self::existing_global_config().as_deref(),
            Self::project_config_path().as_deref(),
            config_path.map(PathBuf::as_path),
        )
    }

    fn load_layers(
        global: Option<&Path>,
        project: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<FileConfig, ConfigLoadError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(path) = global {
            figment = merge_file(figment, path);
        }
        if let Some(path) = project {
            figment = merge_file(figment, path);
        }
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigLoadError::NotFound(path.to_path_buf()));
            }
            figment = merge_file(figment, path);
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment.extract().map_err(|e| ConfigLoadError::Figment(Box::new(e)))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// Get the global config file path
    ///
    /// Returns the first existing `config.{toml,yaml,yml}` under
    /// `$XDG_CONFIG_HOME/tally`, otherwise the `config.toml` location.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::existing_global_config()
            .or_else(|| dirs::config_dir().map(|d| d.join(APP_DIR).join(GLOBAL_FILES[0])))
    }

    fn existing_global_config() -> Option<PathBuf> {
        let dir = dirs::config_dir()?.join(APP_DIR);
        GLOBAL_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources(explicit: Option<&PathBuf>) {
        println!("Configuration sources (in priority order):");

        println!("  [ENV  ] Environment: {}*", ENV_PREFIX);

        if let Some(path) = explicit {
            let mark = if path.exists() { "FOUND" } else { "MISS " };
            println!("  [{}] Explicit: {}", mark, path.display());
        }

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./tally.toml or ./tally.yaml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}
