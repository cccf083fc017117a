//! Pipeline configuration
//!
//! One JSON document with a section per component. Every field has a
//! default, so `{}` is a valid configuration.

use modaics_core::MAX_IMAGE_BYTES;
use modaics_discovery::DiscoveryConfig;
use modaics_encoder::ProviderConfig;
use modaics_vision::ColorExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Images accepted by one batch analysis
pub const MAX_BATCH_IMAGES: usize = 8;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] modaics_core::Error),
}

/// Limits of the analysis entry points
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_batch_images: usize,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_batch_images: MAX_BATCH_IMAGES,
            max_upload_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> modaics_core::Result<()> {
        if self.max_batch_images == 0 {
            return Err(modaics_core::Error::InvalidConfig(
                "max_batch_images must be positive".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(modaics_core::Error::InvalidConfig(
                "max_upload_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub colors: ColorExtractorConfig,
    pub discovery: DiscoveryConfig,
    pub analysis: AnalysisConfig,
}

impl Config {
    /// Load and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider.validate()?;
        self.colors.validate()?;
        self.discovery.validate()?;
        self.analysis.validate()?;
        Ok(())
    }
}
