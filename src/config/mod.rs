//! Configuration module for Meshtastic UI
//!
//! This module handles application configuration including:
//! - User configuration (`config.toml`): device path, backend, log file, UI preferences
//! - Application state persistence (`app_state.json`): last device, recent log files
//!
//! # App Data Location
//!
//! Both files live in the platform-appropriate data directory:
//! - **Linux**: `~/.local/share/dev.meshtastic-ui/`
//! - **macOS**: `~/Library/Application Support/dev.meshtastic-ui/`
//! - **Windows**: `%APPDATA%\dev.meshtastic-ui\`
//!
//! # Example
//!
//! ```ignore
//! use meshtastic_ui::config::{AppConfig, AppState};
//!
//! let config = AppConfig::load_or_default();
//! let mut state = AppState::load_or_default();
//!
//! state.update_last_device(&config.device_path);
//! state.save()?;
//! ```

use crate::error::{MeshUiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.meshtastic-ui";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Directory (inside the app data dir) for diagnostic logs
pub const LOG_DIR: &str = "logs";

/// Serial port the radio usually enumerates as
pub const DEFAULT_DEVICE_PATH: &str = "/dev/ttyACM0";

/// Default time allowed for the device to finish configuration
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Default time allowed for a send to be accepted by the device
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 2_000;

/// Maximum number of recent log files to remember
pub const MAX_RECENT_LOG_FILES: usize = 10;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        MeshUiError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            MeshUiError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

// ==================== App Config ====================

/// Which device implementation to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Real radio over a serial port
    #[default]
    Serial,
    /// In-process simulated radio
    Mock,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Serial => write!(f, "serial"),
            BackendKind::Mock => write!(f, "mock"),
        }
    }
}

/// User configuration loaded from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Serial device the radio is attached to
    pub device_path: String,

    /// Baud rate override (library default when unset)
    pub baud_rate: Option<u32>,

    /// Message log file
    pub log_file: PathBuf,

    /// Device implementation
    pub backend: BackendKind,

    /// Time allowed for connecting and configuring the device
    pub connect_timeout_ms: u64,

    /// Time allowed for a send to be accepted
    pub send_timeout_ms: u64,

    /// UI preferences
    pub ui: UiPreferences,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_path: DEFAULT_DEVICE_PATH.to_string(),
            baud_rate: None,
            log_file: PathBuf::from(crate::session::DEFAULT_LOG_FILE),
            backend: BackendKind::default(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            ui: UiPreferences::default(),
        }
    }
}

impl AppConfig {
    /// Load config from a specific file; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| MeshUiError::Config(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| MeshUiError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let path = config_path().ok_or_else(|| {
            MeshUiError::Config("Could not determine config path".to_string())
        })?;
        Self::load_from(path)
    }

    /// Load config, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MeshUiError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| MeshUiError::Config(format!("Failed to write config: {}", e)))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(CONFIG_FILE))
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.connect_timeout_ms)
    }

    /// Send timeout as a `Duration`
    pub fn send_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.send_timeout_ms)
    }
}

/// UI preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Font scale factor
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

fn default_true() -> bool {
    true
}

fn default_font_scale() -> f32 {
    1.0
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            font_scale: 1.0,
        }
    }
}

// ==================== App State ====================

/// Persistent application state
///
/// Remembers what the user last did, separate from the hand-edited config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Last device path a connection was attempted on
    #[serde(default)]
    pub last_device_path: Option<String>,

    /// Recently opened log files, most recent first
    #[serde(default)]
    pub recent_log_files: Vec<PathBuf>,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_device_path: None,
            recent_log_files: Vec::new(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            MeshUiError::Config("Could not determine app state path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| MeshUiError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| MeshUiError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        let path = dir.join(APP_STATE_FILE);

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MeshUiError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(&path, content)
            .map_err(|e| MeshUiError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Device path to start with
    ///
    /// A `device_path` edited in `config.toml` wins; the remembered path only
    /// replaces the stock default.
    pub fn startup_device_path(&self, config: &AppConfig) -> String {
        if config.device_path != DEFAULT_DEVICE_PATH {
            return config.device_path.clone();
        }
        self.last_device_path
            .clone()
            .unwrap_or_else(|| config.device_path.clone())
    }

    /// Remember the device path of the latest connection attempt
    pub fn update_last_device(&mut self, path: &str) {
        self.last_device_path = Some(path.to_string());
    }

    /// Add or move a log file to the front of the recents list
    pub fn add_recent_log_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.recent_log_files.retain(|p| *p != path);
        self.recent_log_files.insert(0, path);
        self.recent_log_files.truncate(MAX_RECENT_LOG_FILES);
    }
}
