use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, DEFAULT_TIMEOUT};
use crate::error::{PpsError, Result};
use crate::types::AspectRatio;

/// File-backed configuration for the generation service and defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub api: ApiConfig,
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub text_model: String,
    pub image_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub aspect_ratio: AspectRatio,
    pub visual_style: String,
    pub typo_style: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            visual_style: "minimalist".to_string(),
            typo_style: "minimal_line".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            defaults: Defaults::default(),
        }
    }
}

impl Config {
    /// Loads configuration, in priority order: an explicit path, then the
    /// central `~/.config/pps/config.toml`, then built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Some(central) = Self::central_config_path() {
            if central.is_file() {
                return Self::from_file(&central);
            }
        }
        Ok(Self::default())
    }

    /// The central config location, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("pps")
                .join("config.toml")
        })
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| PpsError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(PpsError::Config("api.base_url must not be empty".into()));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(PpsError::Config(format!(
                "api.base_url must start with http:// or https:// (got '{}')",
                self.api.base_url
            )));
        }
        if self.api.timeout.is_zero() {
            return Err(PpsError::Config("api.timeout must be greater than zero".into()));
        }
        if self.api.text_model.trim().is_empty() || self.api.image_model.trim().is_empty() {
            return Err(PpsError::Config("model names must not be empty".into()));
        }
        if crate::catalog::find_visual_style(&self.defaults.visual_style).is_none() {
            return Err(PpsError::Config(format!(
                "Unknown visual style '{}' in defaults.visual_style",
                self.defaults.visual_style
            )));
        }
        if crate::catalog::find_typo_style(&self.defaults.typo_style).is_none() {
            return Err(PpsError::Config(format!(
                "Unknown typography style '{}' in defaults.typo_style",
                self.defaults.typo_style
            )));
        }
        Ok(())
    }
}
