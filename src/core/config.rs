use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::constants::DEFAULT_SERVER_URL;

/// Persistent settings, stored as TOML in the platform config directory.
/// Command-line flags override these; these override built-in defaults.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the advisor backend.
    pub server_url: Option<String>,
    /// Print source citations after each answer.
    pub show_sources: Option<bool>,
    /// Transcript log file enabled at startup.
    pub log_file: Option<String>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let proj_dirs =
            ProjectDirs::from("org", "neuvo", "neuvo").expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn show_sources(&self) -> bool {
        self.show_sources.unwrap_or(true)
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.server_url {
            Some(url) => println!("  server-url: {url}"),
            None => println!("  server-url: (unset, using {DEFAULT_SERVER_URL})"),
        }
        match self.show_sources.unwrap_or(true) {
            true => println!("  show-sources: on"),
            false => println!("  show-sources: off"),
        }
        match &self.log_file {
            Some(path) => println!("  log-file: {path}"),
            None => println!("  log-file: (unset)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.server_url.is_none());
        assert_eq!(config.server_url(), DEFAULT_SERVER_URL);
        assert!(config.show_sources());
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config {
            server_url: Some("http://advisor.example.fi:8080".to_string()),
            show_sources: Some(false),
            log_file: Some("chat.log".to_string()),
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.server_url(), "http://advisor.example.fi:8080");
        assert!(!loaded.show_sources());
        assert_eq!(loaded.log_file.as_deref(), Some("chat.log"));
    }
}
