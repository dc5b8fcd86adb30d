//! TOML configuration document for the particle field.
//!
//! Keys are snake_case; camelCase spellings (`particleCount`,
//! `moveParticlesOnHover`, ...) are accepted as aliases. Every key is optional
//! and falls back to the defaults in [`FieldConfig::default`].

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration at {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldConfig {
    #[serde(alias = "particleCount")]
    pub particle_count: u32,
    #[serde(alias = "particleSpread")]
    pub particle_spread: f32,
    pub speed: f32,
    #[serde(alias = "particleColors", skip_serializing_if = "Option::is_none")]
    pub particle_colors: Option<Vec<String>>,
    #[serde(alias = "moveParticlesOnHover")]
    pub move_particles_on_hover: bool,
    #[serde(alias = "particleHoverFactor")]
    pub particle_hover_factor: f32,
    #[serde(alias = "alphaParticles")]
    pub alpha_particles: bool,
    #[serde(alias = "particleBaseSize")]
    pub particle_base_size: f32,
    #[serde(alias = "sizeRandomness")]
    pub size_randomness: f32,
    #[serde(alias = "cameraDistance")]
    pub camera_distance: f32,
    #[serde(alias = "disableRotation")]
    pub disable_rotation: bool,
    /// Fixed RNG seed for particle generation; random per launch when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(
        deserialize_with = "deserialize_antialias_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub antialias: Option<AntialiasSetting>,
    /// Ask the compositor for a see-through surface behind the particles.
    pub transparent: bool,
    pub window: WindowSection,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 150,
            particle_spread: 15.0,
            speed: 0.1,
            particle_colors: None,
            move_particles_on_hover: true,
            particle_hover_factor: 1.0,
            alpha_particles: true,
            particle_base_size: 80.0,
            size_randomness: 1.0,
            camera_distance: 20.0,
            disable_rotation: false,
            seed: None,
            antialias: None,
            transparent: true,
            window: WindowSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WindowSection {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "particlewall".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntialiasSetting {
    Auto,
    Off,
    Samples2,
    Samples4,
    Samples8,
    Samples16,
}

impl AntialiasSetting {
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            0 | 1 => Some(Self::Off),
            2 => Some(Self::Samples2),
            4 => Some(Self::Samples4),
            8 => Some(Self::Samples8),
            16 => Some(Self::Samples16),
            _ => None,
        }
    }

    pub fn samples(self) -> Option<u32> {
        match self {
            Self::Auto => None,
            Self::Off => Some(1),
            Self::Samples2 => Some(2),
            Self::Samples4 => Some(4),
            Self::Samples8 => Some(8),
            Self::Samples16 => Some(16),
        }
    }
}

impl fmt::Display for AntialiasSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.samples() {
            None => f.write_str("auto"),
            Some(1) => f.write_str("off"),
            Some(samples) => write!(f, "{samples}"),
        }
    }
}

// Written back in the same shape the parser accepts: "auto", "off", or a sample count.
impl Serialize for AntialiasSetting {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.samples() {
            Some(samples) if samples > 1 => serializer.serialize_u32(samples),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}

fn deserialize_antialias_opt<'de, D>(deserializer: D) -> Result<Option<AntialiasSetting>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Helper {
        Str(String),
        Num(i64),
    }

    let helper: Option<Helper> = Option::deserialize(deserializer)?;
    let result = match helper {
        None => None,
        Some(Helper::Str(raw)) => Some(parse_antialias(&raw).map_err(de::Error::custom)?),
        Some(Helper::Num(value)) => {
            if value < 0 {
                return Err(de::Error::custom("antialias value must be non-negative"));
            }
            Some(parse_antialias(&value.to_string()).map_err(de::Error::custom)?)
        }
    };
    Ok(result)
}

/// Parses `auto`, `off`, or an MSAA sample count (2/4/8/16).
pub fn parse_antialias(raw: &str) -> Result<AntialiasSetting, String> {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(AntialiasSetting::Auto),
        "off" | "none" | "disable" | "disabled" | "0" | "1" => Ok(AntialiasSetting::Off),
        "2" => Ok(AntialiasSetting::Samples2),
        "4" => Ok(AntialiasSetting::Samples4),
        "8" => Ok(AntialiasSetting::Samples8),
        "16" => Ok(AntialiasSetting::Samples16),
        other => Err(format!(
            "invalid antialias setting '{other}'; use auto/off or 2/4/8/16"
        )),
    }
}

impl FieldConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FieldConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid(
                "particle_count must be greater than zero".into(),
            ));
        }

        if !self.particle_spread.is_finite() || self.particle_spread <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "particle_spread must be a positive number, got {}",
                self.particle_spread
            )));
        }

        if !(0.0..=1.0).contains(&self.size_randomness) {
            return Err(ConfigError::Invalid(format!(
                "size_randomness must lie in [0, 1], got {}",
                self.size_randomness
            )));
        }

        let finite = [
            ("speed", self.speed),
            ("particle_hover_factor", self.particle_hover_factor),
            ("particle_base_size", self.particle_base_size),
            ("camera_distance", self.camera_distance),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }

        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window dimensions must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
