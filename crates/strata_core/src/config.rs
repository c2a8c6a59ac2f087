//! # Engine Configuration
//!
//! Capacity and recycling settings shared by every world an [`Engine`]
//! creates. Loaded once at startup, either from code or from a TOML file:
//!
//! ```toml
//! default_size = 100000
//! removed_recycle_threshold = 0.01
//! ```
//!
//! [`Engine`]: crate::Engine

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EcsError, EcsResult};

/// Default entity capacity of new worlds and stores.
pub const DEFAULT_SIZE: usize = 100_000;

/// Default fraction of the world size that must sit in the removed queue
/// before handles are reused.
pub const DEFAULT_REMOVED_RECYCLE_THRESHOLD: f64 = 0.01;

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Capacity used for new worlds and components.
    pub default_size: usize,
    /// Removed-queue length, as a fraction of world size, that must be
    /// exceeded before automatic recycling kicks in.
    pub removed_recycle_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_size: DEFAULT_SIZE,
            removed_recycle_threshold: DEFAULT_REMOVED_RECYCLE_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// Missing keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or fails [`validate`].
    ///
    /// [`validate`]: Self::validate
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] for a zero or oversized capacity,
    /// or a threshold that is not a finite fraction in `[0, 1]`.
    pub fn validate(&self) -> EcsResult<()> {
        validate_size(self.default_size)?;
        validate_threshold(self.removed_recycle_threshold)
    }
}

pub(crate) fn validate_size(size: usize) -> EcsResult<()> {
    if size == 0 {
        return Err(EcsError::InvalidConfig("size must be greater than zero".into()));
    }
    if size > u32::MAX as usize {
        return Err(EcsError::InvalidConfig(format!(
            "size {size} exceeds the entity handle range"
        )));
    }
    Ok(())
}

pub(crate) fn validate_threshold(threshold: f64) -> EcsResult<()> {
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(EcsError::InvalidConfig(format!(
            "removed_recycle_threshold must be within [0, 1], got {threshold}"
        )));
    }
    Ok(())
}
