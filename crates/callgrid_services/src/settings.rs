//! Settings management

use callgrid_core::{ConfigError, SimulationConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Built-in preset names accepted by [`Settings::preset`].
pub const PRESETS: [&str; 2] = ["default", "growing"];

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid simulation settings: {0}")]
    Invalid(#[from] ConfigError),
}

/// Wall settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub simulation: SimulationConfig,
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,
    #[serde(default)]
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeSettings {
    /// Interval between rendered frames.
    pub frame_interval_ms: u64,
    /// Stop after this long; run until interrupted when absent.
    pub run_seconds: Option<u64>,
    /// Frames between status reports.
    pub report_every_frames: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            run_seconds: None,
            report_every_frames: 300,
        }
    }
}

fn default_viewport() -> Viewport {
    Viewport::new(1280.0, 720.0)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            viewport: default_viewport(),
            runtime: RuntimeSettings::default(),
        }
    }
}

impl Settings {
    /// Settings for a built-in preset, `None` for unknown names.
    pub fn preset(name: &str) -> Option<Self> {
        let simulation = match name {
            "default" => SimulationConfig::default(),
            "growing" => SimulationConfig::growing(),
            _ => return None,
        };
        Some(Self {
            simulation,
            ..Self::default()
        })
    }

    /// Parse and validate settings from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Resolve a preset name or a settings file path.
    pub fn resolve(name_or_path: &str) -> Result<Self, SettingsError> {
        match Self::preset(name_or_path) {
            Some(settings) => {
                tracing::info!(preset = name_or_path, "using built-in settings");
                Ok(settings)
            }
            None => Self::load(name_or_path),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.simulation.validate()?;
        Ok(())
    }
}
