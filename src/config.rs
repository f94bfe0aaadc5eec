use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Directory under the user's home that holds the config file
pub const CONFIG_DIRECTORY_NAME: &str = ".watermark";
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    HomeDirectoryUnavailable,

    #[error("Default watermark text must not be empty")]
    EmptyDefaultText,

    #[error("Failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Persisted user preferences
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WatermarkConfig {
    /// Text used when `--text` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_text: Option<String>,

    /// Keys this tool does not understand, written back untouched
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WatermarkConfig {
    /// The stored default, ignoring blank values
    pub fn default_text(&self) -> Option<&str> {
        self.default_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Location of the JSON config file and the operations on it
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// `~/.watermark/config.json`
    pub fn default_location() -> Result<Self, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirectoryUnavailable)?;
        Ok(Self::at(
            home.join(CONFIG_DIRECTORY_NAME).join(CONFIG_FILE_NAME),
        ))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config. A missing or unreadable file yields an empty config.
    pub fn load(&self) -> WatermarkConfig {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Config file not found at {:?}, using defaults", self.path);
                return WatermarkConfig::default();
            }
            Err(e) => {
                warn!("Failed to read config file {:?}: {}", self.path, e);
                return WatermarkConfig::default();
            }
        };

        match serde_json::from_str::<WatermarkConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Ignoring malformed config file {:?}: {}",
                    self.path, e
                );
                WatermarkConfig::default()
            }
        }
    }

    /// Replace the whole config file with `config`.
    ///
    /// The content is written to a sibling temporary file first and then
    /// renamed over the target, so a failed write never leaves a truncated
    /// config behind.
    pub fn save(&self, config: &WatermarkConfig) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let content = serde_json::to_string_pretty(config)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(write_error)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_error(e));
        }

        debug!("Config saved to {:?}", self.path);
        Ok(())
    }

    /// Store `text` as the default watermark text
    pub fn set_default_text(&self, text: &str) -> Result<WatermarkConfig, ConfigError> {
        if text.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultText);
        }

        let mut config = self.load();
        config.default_text = Some(text.to_string());
        self.save(&config)?;
        Ok(config)
    }
}
