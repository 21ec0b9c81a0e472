//! Configuration management for the CLI.
//!
//! Everything lives in one TOML file, `~/.papyrus/config.toml` by default.
//! The file is read once per command and never changes while an import runs.

use crate::error::{CliError, Result};
use papyrus_domain::BackendSelection;
use papyrus_extractor::ExtractorConfig;
use papyrus_llm::{LocalModelConfig, RemoteChatConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inference backend used by `import`
    pub backend: BackendSelection,

    /// Library database; defaults to `~/.papyrus/papyrus.db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Global settings
    pub settings: Settings,

    /// Metadata extraction settings
    pub extractor: ExtractorConfig,

    /// Remote chat API settings
    pub remote: RemoteChatConfig,

    /// Bundled model settings
    pub local: LocalModelConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Enable colored output
    pub color: bool,

    /// Default output format
    pub format: OutputFormat,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Directory holding the config file, database and credentials.
    pub fn home_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".papyrus"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.toml"))
    }

    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.extractor.validate().map_err(CliError::Config)?;
        config
            .remote
            .validate()
            .map_err(|e| CliError::Config(format!("[remote] {}", e)))?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Resolved database location.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::home_dir()?.join("papyrus.db")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendSelection::default(),
            database_path: None,
            settings: Settings::default(),
            extractor: ExtractorConfig::default(),
            remote: RemoteChatConfig::default(),
            local: LocalModelConfig::default(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papyrus_extractor::FallbackPolicy;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, BackendSelection::Remote);
        assert!(config.settings.color);
        assert_eq!(config.extractor.max_chars, 4000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.backend = BackendSelection::Local;
        config.database_path = Some(dir.path().join("lib.db"));
        config.extractor.fallback_policy = FallbackPolicy::Placeholder;
        config.remote.model = "gpt-4o".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "backend = \"local\"\n\n[extractor]\nmax_chars = 2000\n\n[local]\ntemplate = \"llama3\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend, BackendSelection::Local);
        assert_eq!(config.extractor.max_chars, 2000);
        assert_eq!(config.local.template, papyrus_llm::ChatTemplate::Llama3);
        assert_eq!(config.remote, RemoteChatConfig::default());
    }

    #[test]
    fn test_invalid_extractor_settings_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[extractor]\nmax_chars = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn test_zero_remote_timeout_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[remote]\ntimeout_secs = 0\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(CliError::Config(ref msg)) if msg.contains("timeout_secs")
        ));
    }

    #[test]
    fn test_explicit_database_path() {
        let config = Config {
            database_path: Some(PathBuf::from("/data/papers.db")),
            ..Config::default()
        };
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/data/papers.db"));
    }
}
