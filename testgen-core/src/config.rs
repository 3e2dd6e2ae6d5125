use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::db::{infer_backend_type, DatabaseConfig};
use crate::generator::GenerationMode;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "TESTGEN_CONFIG_PATH";

/// User configuration for the generator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Mode used when none is given on the command line
    pub default_mode: GenerationMode,
    /// Simulated latency of live generation, in milliseconds
    pub live_delay_ms: u64,
    /// Where saved test cases go
    pub database_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_mode: GenerationMode::Offline,
            live_delay_ms: 2000,
            database_path: PathBuf::from("test_cases.yaml"),
        }
    }
}

impl AppConfig {
    /// Loads the config from the provided path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))
    }

    /// Loads the config if the file exists, otherwise returns defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            log::debug!(
                "No config at {:?}, using defaults",
                path.as_ref()
            );
            Ok(Self::default())
        }
    }

    /// Save the config to the specified path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(&self)?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Writes a default config file if none exists. Returns true if written.
    pub fn create_default<P: AsRef<Path>>(path: P) -> Result<bool> {
        if path.as_ref().exists() {
            return Ok(false);
        }
        Self::default().save(path)?;
        Ok(true)
    }

    pub fn live_delay(&self) -> Duration {
        Duration::from_millis(self.live_delay_ms)
    }

    /// Database settings derived from `database_path`
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            path: self.database_path.clone(),
            backend_type: infer_backend_type(&self.database_path),
        }
    }
}

/// Gets the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    // Default to ~/.testgen.config
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;

    Ok(home_dir.join(".testgen.config"))
}
