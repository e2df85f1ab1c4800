use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::Context, eyre::eyre};
use serde::{Deserialize, Serialize};

use crate::services::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    database_path: String,
    pub port: u16,
    pub order_page_size: u64,
    pub max_page_size: u64,
    /// Origins allowed by CORS in release builds. Debug builds allow any origin.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let database_path = dirs::data_dir()
            .map(|dir| dir.join("cinema-api").join("cinema.db"))
            .map(|path| path.to_string_lossy().to_string())
            .unwrap_or_else(|| "cinema.db".to_string());

        Self {
            database_path,
            port: 3000,
            order_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.order_page_size == 0 || config.max_page_size == 0 {
            return Err(eyre!("Page sizes must be greater than zero"));
        }
        Ok(config)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("cinema-api").join("config.toml"))
    }

    /// Load the default config file, falling back to defaults when there is none
    pub fn load_or_default() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Write the default config to the config path, unless a file is already there
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or(eyre!("No config directory on this platform"))?;
        if path.exists() {
            tracing::info!("Config file already exists at {}", path.display());
            return Ok(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create config directory: {}", parent.display()))?;
        }
        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Expand ~ to home directory
    fn expand_path(&self, path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    pub fn database_path(&self) -> PathBuf {
        self.expand_path(&self.database_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = Config::from_toml("port = 8080").unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.order_page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.max_page_size, MAX_PAGE_SIZE);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_database_path_expands_home() {
        let config = Config::from_toml(r#"database_path = "~/cinema/cinema.db""#).unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.database_path(), home.join("cinema/cinema.db"));
        }
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        assert!(Config::from_toml("order_page_size = 0").is_err());
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let written = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::from_toml(&written).unwrap(), Config::default());
    }
}
