// SPDX-License-Identifier: GPL-3.0-only

use crate::app::BoothSettings;
use crate::constants::{APP_DIR_NAME, relay, timing};
use crate::delivery::RetryPolicy;
use crate::errors::AppError;
use crate::pipelines::photo::FilterType;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the booth configuration file
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Booth settings persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Camera index as printed by `photobooth list`
    pub camera_index: usize,
    /// Filter active when the booth starts
    pub filter: FilterType,
    /// Base URL of the mail relay
    pub relay_url: String,
    /// Where downloaded strips go (default: ~/Pictures/Photobooth)
    pub output_dir: Option<PathBuf>,
    /// Custom template artwork (default: embedded polaroid)
    pub template_path: Option<PathBuf>,
    /// Countdown length before each shot
    pub countdown_seconds: u32,
    /// Extra delivery attempts after a transient failure
    pub retry_attempts: u32,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            filter: FilterType::Normal,
            relay_url: relay::DEFAULT_URL.to_string(),
            output_dir: None,
            template_path: None,
            countdown_seconds: timing::COUNTDOWN_SECONDS,
            retry_attempts: 0,
        }
    }
}

impl BoothConfig {
    /// Default config file location (~/.config/photobooth/config.json)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory, using default settings");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing file gives defaults, a malformed one is
    /// reported and also gives defaults
    pub fn load_from(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(config) => {
                info!(path = %path.display(), "Loaded booth config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed config, using defaults");
                Self::default()
            }
        }
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, data)?;
        Ok(())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(storage::default_output_dir)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::with_retries(self.retry_attempts)
    }

    /// Booth tunables derived from this config
    pub fn booth_settings(&self) -> BoothSettings {
        BoothSettings {
            countdown_seconds: self.countdown_seconds.max(1),
            initial_filter: self.filter,
            output_dir: self.output_dir(),
            ..BoothSettings::default()
        }
    }
}
