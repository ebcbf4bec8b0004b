//! # Application Configuration
//!
//! Settings are read from `config.yaml` in the data directory. A missing file
//! means defaults; a malformed one is an error. `PROPERTY_MANAGER_DATA_DIR`
//! moves the data directory and `PROPERTY_MANAGER_BIND` overrides the bind
//! address from the file.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::storage::DATABASE_FILE;

pub const CONFIG_FILE: &str = "config.yaml";
pub const DATA_DIR_ENV: &str = "PROPERTY_MANAGER_DATA_DIR";
pub const BIND_ENV: &str = "PROPERTY_MANAGER_BIND";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the database and config file live; never read from the file itself
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub database_file: String,
    pub bind_address: String,
    /// Origin allowed by CORS
    pub ui_origin: String,
    /// Used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: DATABASE_FILE.to_string(),
            bind_address: "127.0.0.1:3000".to_string(),
            ui_origin: "http://localhost:8080".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// `~/Documents/Property Manager`, falling back to the home directory and
/// then the working directory
pub fn default_data_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Property Manager")
}

impl AppConfig {
    /// Load using the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(
            std::env::var(DATA_DIR_ENV).ok().as_deref(),
            std::env::var(BIND_ENV).ok().as_deref(),
        )
    }

    /// Load with explicit overrides in place of the environment variables
    pub fn load_with(data_dir: Option<&str>, bind_address: Option<&str>) -> Result<Self> {
        let data_dir = data_dir
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let mut config = Self::load_from_dir(&data_dir)?;
        if let Some(bind) = bind_address.map(str::trim).filter(|b| !b.is_empty()) {
            config.bind_address = bind.to_string();
        }
        Ok(config)
    }

    /// Read `config.yaml` from `data_dir`, or defaults when there is none
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {:?}", path))?;
            let config: AppConfig = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {:?}", path))?;
            info!("Loaded configuration from {:?}", path);
            config
        } else {
            info!("No config file at {:?}, using defaults", path);
            AppConfig::default()
        };

        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load_from_dir(temp_dir.path()).unwrap();

        assert_eq!(config.data_dir, temp_dir.path());
        assert_eq!(config.database_path(), temp_dir.path().join("property-manager.db"));
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
        assert_eq!(config.ui_origin, "http://localhost:8080");
    }

    #[test]
    fn test_file_values_and_overrides() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "database_file: rentals.db\nbind_address: 0.0.0.0:8000\nlog_level: debug\n",
        )
        .unwrap();

        let dir = temp_dir.path().to_string_lossy().to_string();
        let config = AppConfig::load_with(Some(&dir), None).unwrap();
        assert_eq!(config.database_file, "rentals.db");
        assert_eq!(config.bind_address, "0.0.0.0:8000");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.ui_origin, "http://localhost:8080");

        let config = AppConfig::load_with(Some(&dir), Some("127.0.0.1:9999")).unwrap();
        assert_eq!(config.bind_addr().unwrap().port(), 9999);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE), "bind_address: [not, a, string\n").unwrap();
        assert!(AppConfig::load_from_dir(temp_dir.path()).is_err());

        let config = AppConfig {
            bind_address: "nowhere".to_string(),
            ..AppConfig::default()
        };
        assert!(config.bind_addr().is_err());
    }
}
