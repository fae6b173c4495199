use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{FILTER_CACHE_CAPACITY, PROCESSING_TIMEOUT_SECS};
use crate::error::{Result, RoentgenError};
use crate::raster::Color;

/// Viewer configuration, loadable from TOML.
///
/// Every section is optional in the file; missing sections fall back to
/// their defaults, so an empty file is a valid config.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub filters: FilterDefaults,
    #[serde(default)]
    pub annotations: AnnotationConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
}

/// Initial brightness/contrast multipliers applied when an image opens.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub brightness: f32,
    pub contrast: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

/// Initial positions for the three filter sliders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterDefaults {
    pub noise_threshold: f32,
    pub bone_removal: f32,
    pub flesh_removal: f32,
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            noise_threshold: 0.0,
            bone_removal: 0.0,
            flesh_removal: 0.0,
        }
    }
}

/// Stroke color for new annotations and measurements.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnotationConfig {
    pub color: Color,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            color: Color::rgb(255, 210, 60),
        }
    }
}

/// Background processing limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub cache_capacity: usize,
    pub timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            cache_capacity: FILTER_CACHE_CAPACITY,
            timeout_secs: PROCESSING_TIMEOUT_SECS,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| RoentgenError::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| RoentgenError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
