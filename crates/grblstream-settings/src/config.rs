//! Settings persistence and configuration resolution
//!
//! Settings live in a JSON file (`~/.grblstream.json` by default); a file
//! with default values is written on first run. Attribute resolution is
//! collapsed into a single immutable [`StreamConfig`] snapshot, resolved
//! once before the core is constructed: a command-line override wins over
//! the settings file, which wins over the built-in default. The core only
//! ever sees the final scalar values.

use grblstream_core::{Result, SettingsError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default path of the persisted settings file
pub fn default_settings_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".grblstream.json")
}

/// Persisted user settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Serial device GRBL is connected to: a port path, a USB serial
    /// number, or absent to auto-discover
    pub serial_device: Option<String>,
    /// Baud rate for the serial connection
    pub serial_baudrate: u32,
    /// Mirror serial traffic to a log file
    pub serial_logging: bool,
    /// Traffic log file name (relative paths resolve against the working
    /// directory)
    pub serial_log_file: PathBuf,
    /// Poll machine status with `?` while streaming; disable for minimal
    /// serial comms
    pub status_polling: bool,
    /// Status poll interval in milliseconds
    pub status_poll_interval_ms: u64,
    /// GRBL receive buffer size in bytes; only change if the firmware was
    /// compiled with a different buffer
    pub grbl_buffer_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            serial_device: None,
            serial_baudrate: 115_200,
            serial_logging: false,
            serial_log_file: PathBuf::from("grblstream.log"),
            status_polling: true,
            status_poll_interval_ms: 250,
            grbl_buffer_size: 128,
        }
    }
}

impl Settings {
    /// Load settings from `path`, writing a defaults file if none exists
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.is_file() {
            let settings = Self::default();
            settings.save(path)?;
            tracing::info!("created default settings file at {}", path.display());
            return Ok(settings);
        }

        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| SettingsError::InvalidJson {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to `path` as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::WriteFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        std::fs::write(path, content).map_err(|e| SettingsError::WriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<()> {
        if self.serial_baudrate == 0 {
            return Err(SettingsError::Invalid {
                reason: "serial_baudrate must be > 0".to_string(),
            }
            .into());
        }

        if self.grbl_buffer_size == 0 {
            return Err(SettingsError::Invalid {
                reason: "grbl_buffer_size must be > 0".to_string(),
            }
            .into());
        }

        if self.status_poll_interval_ms == 0 {
            return Err(SettingsError::Invalid {
                reason: "status_poll_interval_ms must be > 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Command-line overrides applied on top of the settings file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Serial device selector
    pub device: Option<String>,
    /// Baud rate
    pub baud: Option<u32>,
    /// Traffic log path; giving one implies enabling logging
    pub log_file: Option<PathBuf>,
    /// GRBL receive buffer size
    pub buffer_size: Option<usize>,
    /// Disable status polling
    pub disable_polling: bool,
}

/// Immutable configuration snapshot handed to the streaming core
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Serial device selector, if any was configured
    pub device: Option<String>,
    /// Baud rate
    pub baud: u32,
    /// Traffic log path when logging is enabled
    pub log_file: Option<PathBuf>,
    /// GRBL receive buffer size in bytes
    pub buffer_size: usize,
    /// Whether to poll machine status while streaming
    pub status_polling: bool,
    /// Interval between status polls
    pub poll_interval: Duration,
}

impl StreamConfig {
    /// Resolve the final configuration: CLI override, then settings file,
    /// then built-in default
    pub fn resolve(settings: &Settings, overrides: &Overrides) -> Self {
        let log_file = overrides.log_file.clone().or_else(|| {
            if settings.serial_logging {
                Some(settings.serial_log_file.clone())
            } else {
                None
            }
        });

        Self {
            device: overrides
                .device
                .clone()
                .or_else(|| settings.serial_device.clone()),
            baud: overrides.baud.unwrap_or(settings.serial_baudrate),
            log_file,
            buffer_size: overrides.buffer_size.unwrap_or(settings.grbl_buffer_size),
            status_polling: settings.status_polling && !overrides.disable_polling,
            poll_interval: Duration::from_millis(settings.status_poll_interval_ms),
        }
    }
}
