mod guide;
mod theme;

pub use guide::{builtin_guide, GuideEntry};
pub use theme::{HexColor, Theme};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{DockchatError, Result};
use crate::session::SessionOptions;

const CONFIG_DIR: &str = "dockchat";
const MAIN_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[derive(Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub server: ServerConfig,
    pub ui: UiConfig,
    pub theme: Theme,
    /// Empty means the built-in guide
    pub guide: Vec<GuideEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub tick_interval_ms: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub resume_last: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            log_level: "info".to_string(),
            log_file: None,
            resume_last: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub sidebar_width: u16,
    pub toast_duration_ms: u64,
    pub welcome_message: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sidebar_width: 32,
            toast_duration_ms: 3000,
            welcome_message: SessionOptions::default().welcome_message,
        }
    }
}

impl AppConfig {
    pub fn guide(&self) -> Vec<GuideEntry> {
        if self.guide.is_empty() {
            builtin_guide()
        } else {
            self.guide.clone()
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            welcome_message: self.ui.welcome_message.clone(),
            resume_last: self.general.resume_last,
        }
    }

    /// Command-line flags win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(server) = &cli.server {
            self.server.base_url = server.clone();
        }
        if let Some(level) = &cli.log_level {
            self.general.log_level = level.clone();
        }
        if let Some(file) = &cli.log_file {
            self.general.log_file = Some(file.clone());
        }
        if cli.no_restore {
            self.general.resume_last = false;
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
    app_config: AppConfig,
}

impl ConfigManager {
    /// Load the default config file, or `explicit` when given. An explicit
    /// path that does not exist is an error; a missing default file is not.
    pub fn new(explicit: Option<&Path>) -> Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(DockchatError::ConfigNotFound {
                        path: path.to_path_buf(),
                    });
                }
                path.to_path_buf()
            }
            None => Self::get_config_dir()?.join(MAIN_CONFIG_FILE),
        };

        let app_config = Self::load_toml_file(&config_path).unwrap_or_default();

        Ok(Self {
            config_path,
            app_config,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    fn get_config_dir() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR))
            .ok_or_else(|| DockchatError::Config("Could not determine config directory".to_string()))
    }

    fn load_toml_file<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write the defaults next to the config file unless one already exists.
    pub fn write_default_config(&self) -> Result<()> {
        if self.config_path.exists() {
            return Ok(());
        }
        if let Some(dir) = self.config_path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| DockchatError::Config(format!("Failed to create config dir: {}", e)))?;
        }
        let content = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| DockchatError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&self.config_path, content)
            .map_err(|e| DockchatError::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_app_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:5000");
        assert_eq!(config.ui.toast_duration_ms, 3000);
        assert!(config.general.resume_last);
        assert!(!config.guide().is_empty());
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.tick_interval_ms, config.general.tick_interval_ms);
        assert_eq!(parsed.ui.welcome_message, config.ui.welcome_message);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[server]\nbase_url = \"http://docker-host:8080\"\n\n[[guide]]\ndescription = \"List\"\nexample = \"list containers\""
        )
        .unwrap();

        let manager = ConfigManager::new(Some(file.path())).unwrap();
        let config = manager.app_config();
        assert_eq!(config.server.base_url, "http://docker-host:8080");
        assert_eq!(config.ui.sidebar_width, 32);
        assert_eq!(config.guide(), vec![GuideEntry::new("List", "list containers")]);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbase_url = ").unwrap();

        let manager = ConfigManager::new(Some(file.path())).unwrap();
        assert_eq!(manager.app_config().server.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigManager::new(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(DockchatError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_write_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let manager = ConfigManager {
            config_path: path.clone(),
            app_config: AppConfig::default(),
        };
        manager.write_default_config().unwrap();

        let written: AppConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.server.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = AppConfig::default();
        let cli = Cli::parse_from([
            "dockchat",
            "--server",
            "http://10.0.0.2:5000",
            "--log-level",
            "debug",
            "--no-restore",
        ]);
        config.apply_cli(&cli);
        assert_eq!(config.server.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.general.log_level, "debug");
        assert!(!config.general.resume_last);
    }
}
