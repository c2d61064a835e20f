//! Configuration file handling for video-mirror.
//!
//! Loads configuration from `<config dir>/video-mirror/config.toml` or a
//! custom path. The file is only ever read; nothing is written back.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{CaptureRequest, Resolution, DEFAULT_PROBE_COUNT};
use crate::display::WindowConfig;
use crate::pipeline::{PipelineSettings, Variant};
use crate::session::SessionSettings;

/// Configuration file structure for video-mirror.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub shutdown: ShutdownConfig,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    /// Device indices `0..probe_count` are probed at startup
    #[serde(default = "default_probe_count")]
    pub probe_count: u32,
    /// Force mirroring on or off for both pipeline variants
    #[serde(default)]
    pub mirror: Option<bool>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            probe_count: default_probe_count(),
            mirror: None,
        }
    }
}

/// Requests applied by the threaded pipeline. All best-effort.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    #[serde(default = "default_capture_width")]
    pub width: u32,
    #[serde(default = "default_capture_height")]
    pub height: u32,
    #[serde(default = "default_capture_fps")]
    pub fps: u32,
    #[serde(default = "default_buffer_size")]
    pub buffer_size: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: default_capture_width(),
            height: default_capture_height(),
            fps: default_capture_fps(),
            buffer_size: default_buffer_size(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_true")]
    pub fullscreen: bool,
    /// Window size when not full screen
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default = "default_sync_tick_ms")]
    pub sync_tick_ms: u64,
    #[serde(default = "default_threaded_tick_ms")]
    pub threaded_tick_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            fullscreen: true,
            width: default_window_width(),
            height: default_window_height(),
            sync_tick_ms: default_sync_tick_ms(),
            threaded_tick_ms: default_threaded_tick_ms(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ShutdownConfig {
    /// How long closing waits for the capture thread
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            join_timeout_ms: default_join_timeout_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_probe_count() -> u32 {
    DEFAULT_PROBE_COUNT
}

fn default_capture_width() -> u32 {
    Resolution::UHD.width
}

fn default_capture_height() -> u32 {
    Resolution::UHD.height
}

fn default_capture_fps() -> u32 {
    60
}

fn default_buffer_size() -> u32 {
    1
}

fn default_title() -> String {
    "Video Mirror".to_string()
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_sync_tick_ms() -> u64 {
    10
}

fn default_threaded_tick_ms() -> u64 {
    5
}

fn default_join_timeout_ms() -> u64 {
    500
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            log::debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Session settings for the given pipeline variant.
    pub fn session_settings(&self, variant: Variant) -> SessionSettings {
        SessionSettings {
            probe_count: self.camera.probe_count,
            pipeline: PipelineSettings {
                variant,
                mirror: self.camera.mirror,
                sync_interval: Duration::from_millis(self.display.sync_tick_ms),
                threaded_interval: Duration::from_millis(self.display.threaded_tick_ms),
                request: CaptureRequest {
                    resolution: Resolution::new(self.capture.width, self.capture.height),
                    fps: self.capture.fps,
                    buffer_size: self.capture.buffer_size,
                },
                join_timeout: Duration::from_millis(self.shutdown.join_timeout_ms),
            },
        }
    }

    pub fn window_config(&self) -> WindowConfig {
        WindowConfig {
            title: self.display.title.clone(),
            fullscreen: self.display.fullscreen,
            width: self.display.width,
            height: self.display.height,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("video-mirror").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/video-mirror/config.toml")
        })
}
