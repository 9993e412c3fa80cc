use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::ad_size::{AdSize, DEFAULT_STANDARD_SIZES};

pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_CLICK_THROUGH_URL: &str = "https://www.example.com";
pub const DEFAULT_HERO_JPEG_QUALITY: u8 = 98;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output_dir: PathBuf,
    pub click_through_url: String,
    pub standard_sizes: Vec<AdSize>,
    pub hero_jpeg_quality: u8,
    pub debug_rasters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            click_through_url: DEFAULT_CLICK_THROUGH_URL.to_string(),
            standard_sizes: DEFAULT_STANDARD_SIZES.to_vec(),
            hero_jpeg_quality: DEFAULT_HERO_JPEG_QUALITY,
            debug_rasters: false,
        }
    }
}

impl Config {
    /// Load from an explicit path, else the central config, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };

        let Some(path) = candidate else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    /// `$HOME/.config/psdhtml/config.toml`, when a home directory is known.
    pub fn central_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("psdhtml")
                .join("config.toml")
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("output_dir must not be empty".into()));
        }
        Url::parse(&self.click_through_url).map_err(|e| {
            ConfigError::Invalid(format!(
                "click_through_url '{}' is not a valid URL: {e}",
                self.click_through_url
            ))
        })?;
        if self.hero_jpeg_quality == 0 || self.hero_jpeg_quality > 100 {
            return Err(ConfigError::Invalid(format!(
                "hero_jpeg_quality must be between 1 and 100, got {}",
                self.hero_jpeg_quality
            )));
        }
        if let Some(size) = self
            .standard_sizes
            .iter()
            .find(|s| s.width == 0 || s.height == 0)
        {
            return Err(ConfigError::Invalid(format!(
                "standard size {size} must have positive dimensions"
            )));
        }
        Ok(())
    }

    pub fn is_standard_size(&self, width: u32, height: u32) -> bool {
        self.standard_sizes.contains(&AdSize::new(width, height))
    }
}
