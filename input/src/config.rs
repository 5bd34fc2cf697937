//! Widget configuration loaded from TOML.
//!
//! [`MentionsConfigToml`] mirrors the file with every field optional;
//! [`MentionsConfig`] is the validated form the widget runs with.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use mentions_tracker::BackspaceDeletion;
use mentions_tracker::ConfigError;
use mentions_tracker::TriggerConfig;
use mentions_tracker::TriggerLocation;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_TEXT_INPUT_MIN_HEIGHT: f32 = 40.0;
pub const DEFAULT_TEXT_INPUT_MAX_HEIGHT: f32 = 120.0;
pub const DEFAULT_SUGGESTIONS_PANEL_HEIGHT: f32 = 60.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MentionsConfigToml {
    pub trigger: Option<char>,
    pub trigger_location: Option<TriggerLocation>,
    pub trigger_delay: Option<usize>,
    pub backspace_deletion: Option<BackspaceDeletion>,
    pub text_input_min_height: Option<f32>,
    pub text_input_max_height: Option<f32>,
    pub suggestions_panel_height: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MentionsConfig {
    pub trigger: TriggerConfig,
    pub text_input_min_height: f32,
    pub text_input_max_height: f32,
    pub suggestions_panel_height: f32,
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::default(),
            text_input_min_height: DEFAULT_TEXT_INPUT_MIN_HEIGHT,
            text_input_max_height: DEFAULT_TEXT_INPUT_MAX_HEIGHT,
            suggestions_panel_height: DEFAULT_SUGGESTIONS_PANEL_HEIGHT,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse mentions config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Trigger(#[from] ConfigError),
    #[error("{field} must be a finite, non-negative number (got {value})")]
    InvalidDimension { field: &'static str, value: f32 },
    #[error("text_input_min_height {min} exceeds text_input_max_height {max}")]
    HeightRange { min: f32, max: f32 },
}

impl TryFrom<MentionsConfigToml> for MentionsConfig {
    type Error = ConfigLoadError;

    fn try_from(toml: MentionsConfigToml) -> Result<Self, Self::Error> {
        let defaults = TriggerConfig::default();
        let trigger = TriggerConfig {
            trigger: toml.trigger.unwrap_or(defaults.trigger),
            trigger_location: toml.trigger_location.unwrap_or(defaults.trigger_location),
            trigger_delay: toml.trigger_delay.unwrap_or(defaults.trigger_delay),
            backspace_deletion: toml
                .backspace_deletion
                .unwrap_or(defaults.backspace_deletion),
        };
        trigger.validate()?;

        let text_input_min_height = dimension(
            "text_input_min_height",
            toml.text_input_min_height,
            DEFAULT_TEXT_INPUT_MIN_HEIGHT,
        )?;
        let text_input_max_height = dimension(
            "text_input_max_height",
            toml.text_input_max_height,
            DEFAULT_TEXT_INPUT_MAX_HEIGHT,
        )?;
        if text_input_min_height > text_input_max_height {
            return Err(ConfigLoadError::HeightRange {
                min: text_input_min_height,
                max: text_input_max_height,
            });
        }
        let suggestions_panel_height = dimension(
            "suggestions_panel_height",
            toml.suggestions_panel_height,
            DEFAULT_SUGGESTIONS_PANEL_HEIGHT,
        )?;

        Ok(Self {
            trigger,
            text_input_min_height,
            text_input_max_height,
            suggestions_panel_height,
        })
    }
}

fn dimension(field: &'static str, value: Option<f32>, default: f32) -> Result<f32, ConfigLoadError> {
    let value = value.unwrap_or(default);
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigLoadError::InvalidDimension { field, value })
    }
}

impl MentionsConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigLoadError> {
        let raw: MentionsConfigToml = toml::from_str(contents)?;
        Self::try_from(raw)
    }
}

/// Reads and validates a config file.
pub fn load_config(path: &Path) -> Result<MentionsConfig, ConfigLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = MentionsConfig::from_toml_str(&contents)?;
    tracing::debug!(path = %path.display(), ?config, "loaded mentions config");
    Ok(config)
}
