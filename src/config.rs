//! Configuration file support for the body explorer.
//!
//! Every field has a default, so a partial (or empty) JSON object is a valid
//! configuration. The file is versioned; files written by a newer release
//! are rejected instead of being half-understood.

use std::path::PathBuf;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ASSET_ROOT, DEFAULT_CAMERA_POSITION, DEFAULT_CLICK_TOLERANCE_PX,
    DEFAULT_DISPLAY_OFFSET, DEFAULT_DISPLAY_SCALE, DEFAULT_FOV_DEGREES,
    DEFAULT_LOAD_TIMEOUT_SECS, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE, DEFAULT_MODEL_URL,
};
use crate::geometry::DisplayTransform;
use crate::resolver::SlabTable;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Version of the configuration file format
    pub version: u32,

    pub preferences: Preferences,

    pub model: ModelConfig,

    pub camera: CameraConfig,

    pub picking: PickingConfig,

    /// Height bands for the fallback mesh classification
    pub slabs: SlabTable,
}

/// User preferences section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Log verbosity level
    pub log_level: LogLevel,
}

/// Where the body model comes from and how it is placed in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// URL path of the model
    pub url: String,
    /// Directory the URL path is resolved against when running natively
    pub asset_root: PathBuf,
    /// Uniform scale applied before display
    pub display_scale: f32,
    /// Translation applied after scaling
    pub display_offset: [f32; 3],
    /// Seconds before the loading overlay clears regardless of load state
    pub load_timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_MODEL_URL.to_string(),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            display_scale: DEFAULT_DISPLAY_SCALE,
            display_offset: DEFAULT_DISPLAY_OFFSET,
            load_timeout_secs: DEFAULT_LOAD_TIMEOUT_SECS,
        }
    }
}

impl ModelConfig {
    pub fn display(&self) -> DisplayTransform {
        DisplayTransform::new(self.display_scale, Vec3::from_array(self.display_offset))
    }

    /// Filesystem path of the model: the URL path under the asset root.
    pub fn asset_path(&self) -> PathBuf {
        self.asset_root.join(self.url.trim_start_matches('/'))
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.load_timeout_secs)
    }
}

/// Orbit camera limits and starting pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_degrees: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub enable_pan: bool,
    pub enable_zoom: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: DEFAULT_CAMERA_POSITION,
            fov_degrees: DEFAULT_FOV_DEGREES,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            enable_pan: true,
            enable_zoom: true,
        }
    }
}

/// Pointer handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Pointer travel (pixels) after which a press becomes a camera drag
    pub click_tolerance_px: f32,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            click_tolerance_px: DEFAULT_CLICK_TOLERANCE_PX,
        }
    }
}

impl ViewerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: Preferences::default(),
            model: ModelConfig::default(),
            camera: CameraConfig::default(),
            picking: PickingConfig::default(),
            slabs: SlabTable::default(),
        }
    }

    /// Check values the rest of the viewer relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.model.display_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "model.display_scale must be positive, got {scale}"
            )));
        }
        if !self.model.display_offset.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid(
                "model.display_offset must be finite".to_string(),
            ));
        }
        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.min_distance > 0.0 && cam.min_distance <= cam.max_distance) {
            return Err(ConfigError::Invalid(format!(
                "camera distance limits are inconsistent ({} .. {})",
                cam.min_distance, cam.max_distance
            )));
        }
        if !cam.position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid(
                "camera.position must be finite".to_string(),
            ));
        }
        let tolerance = self.picking.click_tolerance_px;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "picking.click_tolerance_px must be non-negative, got {tolerance}"
            )));
        }
        self.slabs
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("slabs: {e}")))
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize and validate configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("body-explorer").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("body-explorer")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }
        Self::load_from(&path)
    }

    /// Load configuration from a file, logging and returning None on failure.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Option<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
