use crate::color::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, EnumString};

/// Longest configurable duration for a single phase, in seconds.
pub(crate) const MAX_DURATION: f64 = 60.0;

/// Range accepted for the per cycle drift factor.
pub(crate) const MIN_DRIFT: f64 = 0.5;
pub(crate) const MAX_DRIFT: f64 = 1.5;

/// The user preferences driving the breathing cycle and its rendering.
///
/// Every field is part of the config file format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) struct Settings {
    /// Seconds spent breathing in.
    pub(crate) inhale_duration: f64,

    /// Seconds to hold after breathing in.
    pub(crate) post_inhale_hold_duration: f64,

    /// Seconds spent breathing out.
    pub(crate) exhale_duration: f64,

    /// Seconds to hold after breathing out.
    pub(crate) post_exhale_hold_duration: f64,

    pub(crate) inhale_color: Rgba,
    pub(crate) exhale_color: Rgba,
    pub(crate) background_color: Rgba,

    pub(crate) color_fill_type: ColorFillType,

    /// Whether the shape color fades between the inhale and exhale colors.
    pub(crate) color_transition_enabled: bool,

    pub(crate) shape: AnimationShape,
    pub(crate) animation_mode: AnimationMode,

    /// Multiplier applied to every phase duration once per completed cycle.
    pub(crate) drift: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            inhale_duration: 5.0,
            post_inhale_hold_duration: 0.0,
            exhale_duration: 10.0,
            post_exhale_hold_duration: 0.0,
            inhale_color: Rgba::opaque(1.0, 0.0, 0.0),
            exhale_color: Rgba::opaque(0.0, 0.0, 1.0),
            background_color: Rgba::BLACK,
            color_fill_type: ColorFillType::Constant,
            color_transition_enabled: true,
            shape: AnimationShape::Rectangle,
            animation_mode: AnimationMode::Eased,
            drift: 1.0,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, falling back to defaults if it doesn't exist.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(path.to_path_buf(), e)),
        };
        let settings = Self::from_yaml(&contents)?;
        log::info!("loaded config from {}", path.display());
        Ok(settings)
    }

    pub(crate) fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_yaml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Persist these settings, creating the parent directory if needed.
    pub(crate) fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(path, self.to_yaml()?).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        log::info!("saved config to {}", path.display());
        Ok(())
    }

    /// Reject values the breathing cycle can't be driven with.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("inhale_duration", self.inhale_duration),
            ("post_inhale_hold_duration", self.post_inhale_hold_duration),
            ("exhale_duration", self.exhale_duration),
            ("post_exhale_hold_duration", self.post_exhale_hold_duration),
        ];
        for (name, value) in durations {
            if !(0.0..=MAX_DURATION).contains(&value) {
                log::warn!("rejecting {name} = {value}");
                return Err(ConfigError::InvalidDuration(name, value));
            }
        }
        if !(MIN_DRIFT..=MAX_DRIFT).contains(&self.drift) {
            log::warn!("rejecting drift = {}", self.drift);
            return Err(ConfigError::InvalidDrift(self.drift));
        }
        Ok(())
    }
}

/// How the shape is filled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) enum ColorFillType {
    #[default]
    Constant,
    Gradient,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) enum AnimationShape {
    #[default]
    Rectangle,
    Circle,
}

/// The curve progress follows within an inhale or exhale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "json-schema", derive(schemars::JsonSchema))]
pub(crate) enum AnimationMode {
    Linear,
    #[default]
    Eased,
}

/// Where the config file lives when no explicit path is given.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "exhale").map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Errors that can occur when loading, validating or saving settings
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} must be between 0 and 60 seconds, got {1}")]
    InvalidDuration(&'static str, f64),

    #[error("drift must be between 0.5 and 1.5, got {0}")]
    InvalidDrift(f64),

    #[error("io error on {0}: {1}")]
    Io(PathBuf, io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn partial_config_uses_defaults() {
        let settings = Settings::from_yaml("shape: circle\ninhale_color: '#00ff00'\n").expect("parse failed");
        assert_eq!(settings.shape, AnimationShape::Circle);
        assert_eq!(settings.inhale_color, Rgba::opaque(0.0, 1.0, 0.0));
        assert_eq!(settings.exhale_duration, Settings::default().exhale_duration);
    }

    #[test]
    fn unknown_field_rejected() {
        assert!(Settings::from_yaml("breathe_faster: true\n").is_err());
    }

    #[rstest]
    #[case::negative_inhale("inhale_duration: -1\n")]
    #[case::negative_hold("post_exhale_hold_duration: -0.5\n")]
    #[case::zero_drift("drift: 0\n")]
    #[case::negative_drift("drift: -0.9\n")]
    #[case::too_long("exhale_duration: 61\n")]
    #[case::huge("inhale_duration: 1e300\n")]
    #[case::infinite("post_inhale_hold_duration: .inf\n")]
    #[case::not_a_number("exhale_duration: .nan\n")]
    #[case::drift_too_small("drift: 0.1\n")]
    #[case::drift_too_large("drift: 2\n")]
    fn invalid_values_rejected(#[case] input: &str) {
        let result = Settings::from_yaml(input);
        assert!(
            matches!(result, Err(ConfigError::InvalidDuration(..) | ConfigError::InvalidDrift(_))),
            "{result:?}"
        );
    }

    #[rstest]
    #[case::empty_hold("post_inhale_hold_duration: 0\n")]
    #[case::longest("inhale_duration: 60\n")]
    #[case::slowest_drift("drift: 0.5\n")]
    #[case::fastest_drift("drift: 1.5\n")]
    fn boundary_values_accepted(#[case] input: &str) {
        Settings::from_yaml(input).expect("boundary value rejected");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("no tempdir");
        let path = dir.path().join("nested").join("config.yaml");
        let settings = Settings {
            color_fill_type: ColorFillType::Gradient,
            drift: 0.95,
            background_color: Rgba::from_rgba8(16, 16, 16, 255),
            ..Default::default()
        };
        settings.save(&path).expect("save failed");
        let loaded = Settings::load(&path).expect("load failed");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("no tempdir");
        let loaded = Settings::load(&dir.path().join("missing.yaml")).expect("load failed");
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn enum_names() {
        assert_eq!(AnimationMode::Eased.to_string(), "eased");
        assert_eq!("circle".parse::<AnimationShape>().ok(), Some(AnimationShape::Circle));
    }
}
