//! Synchronization settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::curve::DEFAULT_LUT_SIZE;

/// Largest lookup table accepted from settings.
pub const MAX_LUT_SIZE: usize = 65536;

/// Error types for loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings text is not valid TOML for [`SyncSettings`].
    #[error("invalid settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// The lookup table size is out of range.
    #[error("lut_size must be between 2 and 65536, got {0}")]
    InvalidLutSize(usize),
}

/// Behaviour switches for curve synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Mark the link to an unsupported upstream node as invalid.
    pub invalidate_unsupported_links: bool,
    /// Number of samples in each curve's lookup table.
    pub lut_size: usize,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            invalidate_unsupported_links: true,
            lut_size: DEFAULT_LUT_SIZE,
        }
    }
}

impl SyncSettings {
    /// Parse and validate settings from TOML. Missing keys keep defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(2..=MAX_LUT_SIZE).contains(&self.lut_size) {
            return Err(SettingsError::InvalidLutSize(self.lut_size));
        }
        Ok(())
    }
}
