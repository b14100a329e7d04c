//! Configuration system

pub mod display;

pub use display::DisplayTarget;
pub use serde::{Serialize, Deserialize};

/// File-backed settings, read from `.toml` or `.ron` by extension
///
/// [`WindowManagerConfig`] is the one implementor in this crate: a `[window]`
/// table of default geometry, an `[event_loop]` table, and top-level
/// `display` and `log_level` keys.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// # Window Manager Configuration
///
/// Top-level settings read once at session start. Every field has a default,
/// so a partial file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowManagerConfig {
    /// Display target used when neither `DISPLAY` nor `--display` is given
    pub display: Option<String>,
    /// Geometry for newly created windows
    pub window: WindowDefaults,
    /// Main loop scheduling
    pub event_loop: EventLoopConfig,
    /// Default log filter (overridden by `RUST_LOG`)
    pub log_level: String,
}

impl Default for WindowManagerConfig {
    fn default() -> Self {
        Self {
            display: None,
            window: WindowDefaults::default(),
            event_loop: EventLoopConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config for WindowManagerConfig {}

/// Fixed geometry every window starts with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowDefaults {
    /// Initial x position
    pub x: i32,
    /// Initial y position
    pub y: i32,
    /// Initial width in pixels
    pub width: u32,
    /// Initial height in pixels
    pub height: u32,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 640,
            height: 480,
        }
    }
}

/// Main loop scheduling options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLoopConfig {
    /// Sleep after a no-event sweep, in milliseconds. `None` busy-polls.
    pub idle_sleep_ms: Option<u64>,
}

impl EventLoopConfig {
    /// Idle sleep as a duration
    pub fn idle_sleep(&self) -> Option<std::time::Duration> {
        self.idle_sleep_ms.map(std::time::Duration::from_millis)
    }
}
