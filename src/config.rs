//! Configuration module for sunsys.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file (`.sunsys/settings.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SUNSYS_` and use double
//! underscores to separate nested levels:
//! - `SUNSYS_SIMULATION__SAMPLING_TIME=0.01` sets `simulation.sampling_time`
//! - `SUNSYS_LOGGING__DEFAULT=debug` sets `logging.default`
//! - `SUNSYS_DOCS__SEARCH_DIR=doc/html/search` sets `docs.search_dir`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory holding the workspace settings.
pub const CONFIG_DIR: &str = ".sunsys";
pub const CONFIG_FILE: &str = "settings.toml";
const ENV_PREFIX: &str = "SUNSYS_";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Workspace root directory (where .sunsys is located)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_root: Option<PathBuf>,

    /// Global debug mode
    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults for `sunsys simulate`
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Documentation search index location
    #[serde(default)]
    pub docs: DocsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Level for everything not listed in `modules`
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target levels, e.g. `sunsys::observers = "debug"`
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Sampling time used when a model does not give one
    #[serde(default = "default_sampling_time")]
    pub sampling_time: f64,

    /// Number of steps when neither the file nor the CLI give one
    #[serde(default = "default_steps")]
    pub steps: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DocsConfig {
    /// Directory with the `searchData` fragments (`html/search`)
    #[serde(default = "default_search_dir")]
    pub search_dir: PathBuf,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_sampling_time() -> f64 {
    0.01
}
fn default_steps() -> usize {
    100
}
fn default_search_dir() -> PathBuf {
    PathBuf::from("doc/html/search")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            workspace_root: None,
            debug: false,
            logging: LoggingConfig::default(),
            simulation: SimulationConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            sampling_time: default_sampling_time(),
            steps: default_steps(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            search_dir: default_search_dir(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .sunsys directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::figment(&config_path)
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                // If workspace_root is not set in config, detect it
                if settings.workspace_root.is_none() {
                    settings.workspace_root = Self::workspace_root();
                }
                settings
            })
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Double underscore separates nested levels, single underscore
            // stays inside field names
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
    }

    /// Find the workspace config by looking for a .sunsys directory,
    /// from the current directory up to the root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Get the workspace root directory (where .sunsys is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(ancestor.to_path_buf());
            }
        }

        None
    }

    /// Check if configuration is properly initialized
    pub fn check_init() -> Result<(), String> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        if !config_path.exists() {
            return Err("No configuration file found".to_string());
        }

        // Try to parse the config file to check if it's valid
        match std::fs::read_to_string(&config_path) {
            Ok(content) => {
                if let Err(e) = toml::from_str::<Settings>(&content) {
                    return Err(format!(
                        "Configuration file is corrupted: {e}\nRun 'sunsys init --force' to regenerate."
                    ));
                }
            }
            Err(e) => {
                return Err(format!("Cannot read configuration file: {e}"));
            }
        }

        Ok(())
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file in `dir/.sunsys`
    pub fn init_config_file(dir: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        let settings = Settings {
            workspace_root: Some(dir.to_path_buf()),
            ..Settings::default()
        };
        settings.save(&config_path)?;

        Ok(config_path)
    }

    /// Search directory, relative paths resolved against the workspace root
    pub fn search_dir(&self) -> PathBuf {
        match &self.workspace_root {
            Some(root) if self.docs.search_dir.is_relative() => root.join(&self.docs.search_dir),
            _ => self.docs.search_dir.clone(),
        }
    }
}
