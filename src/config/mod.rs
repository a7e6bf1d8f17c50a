#[cfg(test)]
pub mod config_test;

use std::{io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gesture::contact::MAX_CONTACTS;

/// Represents all possible errors loading a [GestureConfig]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Tuning parameters for the gesture engine. Every field has a default, so an
/// empty YAML document yields [GestureConfig::default].
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct GestureConfig {
    /// Duration of the short-tap window in milliseconds. Down/up edges of the
    /// focus finger within this window are counted as taps.
    pub short_tap_ms: u64,
    /// Maximum distance the focus finger may stray from the first contact
    /// when the second tap begins.
    pub short_move_tolerance: u32,
    /// Maximum distance the focus finger may stray from the first contact
    /// during the third and fourth tap edges.
    pub short_move_range: u32,
    /// Delay between consecutive synthesized button transitions
    pub button_pacing_ms: u64,
    /// Number of simultaneous contacts that toggles the pointing mode when
    /// all of them are released.
    pub toggle_contacts: usize,
    /// Logical maximum of the touch Y axis. Scrolling inverts Y against it.
    pub max_mouse_y: i32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            short_tap_ms: 300,
            short_move_tolerance: 100,
            short_move_range: 1000,
            button_pacing_ms: 50,
            toggle_contacts: 4,
            max_mouse_y: 4095,
        }
    }
}

impl GestureConfig {
    /// Load a [GestureConfig] from the given YAML string
    pub fn from_yaml(content: String) -> Result<GestureConfig, LoadError> {
        let config: GestureConfig = serde_yaml::from_str(content.as_str())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a [GestureConfig] from the given YAML file
    pub fn from_yaml_file(path: String) -> Result<GestureConfig, LoadError> {
        GestureConfig::from_yaml_path(path)
    }

    /// Load a [GestureConfig] from the given YAML file path
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<GestureConfig, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: GestureConfig = serde_yaml::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the gesture engine cannot work with. The toggle must need
    /// more contacts than the one and two finger gestures.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.short_tap_ms == 0 {
            return Err(LoadError::InvalidConfig(
                "short_tap_ms must be greater than 0".to_string(),
            ));
        }
        if !(3..=MAX_CONTACTS).contains(&self.toggle_contacts) {
            return Err(LoadError::InvalidConfig(format!(
                "toggle_contacts must be between 3 and {MAX_CONTACTS}, got {}",
                self.toggle_contacts
            )));
        }
        Ok(())
    }

    /// Serialize this configuration as YAML
    pub fn to_yaml(&self) -> Result<String, LoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Length of the short-tap window
    pub fn short_tap_window(&self) -> Duration {
        Duration::from_millis(self.short_tap_ms)
    }

    /// Delay between consecutive synthesized button transitions
    pub fn button_pacing(&self) -> Duration {
        Duration::from_millis(self.button_pacing_ms)
    }
}
