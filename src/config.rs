// SPDX-License-Identifier: GPL-3.0-only

//! User configuration, persisted as JSON in the platform config directory

use crate::backends::CameraFacing;
use crate::constants::APP_NAME;
use crate::output::SinkPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Output sink family the platform supports
    pub sink_policy: SinkPolicy,
    /// Lens used when the caller does not pick one explicitly
    pub default_facing: CameraFacing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sink_policy: SinkPolicy::default(),
            default_facing: CameraFacing::Back,
        }
    }
}

impl Config {
    fn path() -> Option<PathBuf> {
        Some(dirs::config_dir()?.join(APP_NAME).join("config.json"))
    }

    /// Load the config, falling back to defaults when missing or unreadable
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };

        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Config unreadable, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist the config
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::other("no config directory"));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, bytes)
    }
}
