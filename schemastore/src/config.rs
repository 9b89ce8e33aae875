//! Application configuration loaded from a YAML file.
//!
//! The file is looked up in this order:
//!
//! 1. the path given with `--config` or `SCHEMASTORE_CONFIG`
//! 2. `.schemastore.yaml` in the home directory
//! 3. `.schemastore.yaml` in the working directory
//!
//! ```yaml
//! is_production: false
//! short_name: ninja
//! long_name: Ninja API engine
//! bind: 127.0.0.1:8082
//! db_config:
//!   driver_type: mongodb
//!   connection_string: mongodb://localhost:27017
//!   database_name: ninja
//! ```

use std::{
    fs,
    io,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use schemastore_core::registry::DriverConfig;

/// File name searched for in the home and working directories.
pub const CONFIG_FILE_NAME: &str = ".schemastore.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No configuration file found (searched: {})", display_paths(.searched))]
    NotFound { searched: Vec<PathBuf> },
    #[error("Failed to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Top-level application configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// When false, the loaded configuration is logged at startup.
    #[serde(default)]
    pub is_production: bool,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub long_name: String,
    /// Address the REST server listens on.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    pub db_config: DriverConfig,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8082))
}

impl AppConfig {
    /// Parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Locates and parses the configuration file, returning it with the path it was
    /// read from. An explicit path is never substituted by the default locations.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let cwd = std::env::current_dir().ok();
        let path = find_config(explicit, dirs::home_dir().as_deref(), cwd.as_deref())?;
        let config = Self::from_file(&path)?;

        Ok((config, path))
    }
}

/// Resolves the configuration file path from the lookup order.
pub fn find_config(
    explicit: Option<&Path>,
    home: Option<&Path>,
    cwd: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    let candidates = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => [home, cwd]
            .into_iter()
            .flatten()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .collect(),
    };

    if let Some(path) = candidates.iter().find(|path| path.is_file()) {
        return Ok(path.clone());
    }

    Err(ConfigError::NotFound {
        searched: candidates,
    })
}
