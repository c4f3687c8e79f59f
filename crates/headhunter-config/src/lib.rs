use headhunter_engine::{ConfigValue, MatchOptions, ParserConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    #[serde(default)]
    pub expected_headings: Vec<String>,
    #[serde(default = "default_threshold")]
    pub threshold: u8,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            expected_headings: Vec::new(),
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> u8 {
    MatchOptions::DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    /// Parser overrides, passed through to [`ParserConfig::from_entries`].
    #[serde(default)]
    pub parser: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub matching: MatchingConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the output directory
        config.output_dir = config
            .output_dir
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/headhunter");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Builds the parser configuration from the `[parser]` table.
    ///
    /// Ignored keys come back as warnings; an invalid pattern is an error.
    pub fn parser_config(&self) -> Result<(ParserConfig, Vec<String>), headhunter_engine::ConfigError> {
        ParserConfig::from_entries(
            self.parser
                .iter()
                .map(|(key, value)| (key.as_str(), to_config_value(value))),
        )
    }

    /// Matching options, or `None` when no expected headings are configured.
    pub fn match_options(&self) -> Option<MatchOptions> {
        if self.matching.expected_headings.is_empty() {
            return None;
        }
        Some(
            MatchOptions::new(self.matching.expected_headings.iter().cloned())
                .with_threshold(self.matching.threshold),
        )
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

fn to_config_value(value: &toml::Value) -> ConfigValue {
    match value {
        toml::Value::Integer(n) => ConfigValue::Integer(*n),
        toml::Value::String(s) => ConfigValue::String(s.clone()),
        other => ConfigValue::Other(other.to_string()),
    }
}
