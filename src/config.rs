//! Configuration file support for Metragem.
//!
//! Settings are stored as versioned JSON under [`CONFIG_STORAGE_KEY`] in the
//! same storage backend as the application state: a file in the config
//! directory for native builds, `localStorage` for WASM builds. Missing or
//! unreadable settings mean defaults.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_LINE_WIDTH, DEFAULT_STROKE_COLOR, STATE_STORAGE_KEY,
};
use crate::drawing::{HistoryConfig, StrokeColor, ToolState};
use crate::state::{StateStorage, StorageError};
use crate::units::{CurrencyFormat, DEFAULT_CURRENCY_SYMBOL};

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

    /// Convert to the log crate's Level (for loggers that take a Level).
    pub fn to_level(&self) -> log::Level {
        match self {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Application name (for identification)
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Annotation canvas defaults
    #[serde(default)]
    pub canvas: CanvasConfig,
}

fn default_app_name() -> String {
    "Metragem".to_string()
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Storage key of the persisted application state
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Folder reports are written to (native); empty for the working directory
    #[serde(default)]
    pub export_folder: String,

    /// Currency symbol shown before amounts
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_storage_key() -> String {
    STATE_STORAGE_KEY.to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            storage_key: default_storage_key(),
            export_folder: String::new(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl UserPreferences {
    pub fn currency(&self) -> CurrencyFormat {
        CurrencyFormat::new(self.currency_symbol.as_str())
    }
}

/// Canvas section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Canvas height in pixels
    #[serde(default = "default_canvas_height")]
    pub height: u32,

    /// Initial pencil color as `#rrggbb`
    #[serde(default = "default_color")]
    pub default_color: String,

    /// Initial pencil width in pixels
    #[serde(default = "default_line_width")]
    pub default_line_width: f32,

    /// Undo steps kept per drawing, unlimited if absent
    #[serde(default)]
    pub max_history: Option<usize>,
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_color() -> String {
    StrokeColor(DEFAULT_STROKE_COLOR).to_hex()
}

fn default_line_width() -> f32 {
    DEFAULT_LINE_WIDTH
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            height: default_canvas_height(),
            default_color: default_color(),
            default_line_width: default_line_width(),
            max_history: None,
        }
    }
}

impl CanvasConfig {
    /// The configured color, or black if it doesn't parse.
    pub fn stroke_color(&self) -> StrokeColor {
        StrokeColor::from_hex(&self.default_color).unwrap_or_else(|| {
            log::warn!("Invalid canvas color '{}', using default", self.default_color);
            StrokeColor::default()
        })
    }

    /// The configured width, or the default if it isn't a positive number.
    pub fn line_width(&self) -> f32 {
        if self.default_line_width.is_finite() && self.default_line_width > 0.0 {
            self.default_line_width
        } else {
            DEFAULT_LINE_WIDTH
        }
    }

    /// The configured height, or the default if it is zero.
    pub fn pixel_height(&self) -> u32 {
        if self.height > 0 {
            self.height
        } else {
            log::warn!("Canvas height 0 in config, using {}", DEFAULT_CANVAS_HEIGHT);
            DEFAULT_CANVAS_HEIGHT
        }
    }

    pub fn history(&self) -> HistoryConfig {
        HistoryConfig {
            max_history: self.max_history,
        }
    }

    /// Make the current pencil settings the defaults for the next session.
    pub fn remember_tools(&mut self, tools: &ToolState) {
        self.default_color = tools.color.to_hex();
        self.default_line_width = tools.line_width;
    }
}

/// Storage key the configuration lives under.
///
/// With [`FileStorage`](crate::state::FileStorage) this is the file
/// `metragem-config.json` next to the state file.
pub const CONFIG_STORAGE_KEY: &str = "metragem-config";

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            app_name: default_app_name(),
            preferences: UserPreferences::default(),
            canvas: CanvasConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read the configuration, `None` if none was saved yet.
    pub fn load(storage: &impl StateStorage) -> Result<Option<Self>, ConfigError> {
        storage
            .load(CONFIG_STORAGE_KEY)?
            .map(|json| Self::from_json(&json))
            .transpose()
    }

    /// Read the configuration, falling back to defaults on any problem.
    pub fn load_or_default(storage: &impl StateStorage) -> Self {
        match Self::load(storage) {
            Ok(Some(config)) => {
                log::info!("Loaded configuration");
                config
            }
            Ok(None) => {
                log::debug!("No saved configuration, using defaults");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring saved configuration: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut impl StateStorage) -> Result<(), ConfigError> {
        storage.save(CONFIG_STORAGE_KEY, &self.to_json()?)?;
        log::info!("Saved configuration");
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading or saving configuration.
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

    #[error(transparent)]
    Storage(#[from] StorageError),
}
