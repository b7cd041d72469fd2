//! Configuration loading for the comic shelf.
//!
//! All user-tunable settings are centralized here and loaded from
//! `conf/config.toml` if present. Any missing or invalid entries fall back to
//! sensible defaults so the shelf can still come up.

use crate::comic::ZoomLevel;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_append_threshold_px")]
    pub append_threshold_px: f32,
    #[serde(default)]
    pub zoom_level: ZoomLevel,
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            backend_url: default_backend_url(),
            page_size: default_page_size(),
            append_threshold_px: default_append_threshold_px(),
            zoom_level: ZoomLevel::default(),
            log_level: default_log_level(),
        }
    }
}

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&contents) {
        Ok(mut cfg) => {
            debug!("Parsed configuration from disk");
            clamp_config(&mut cfg);
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

fn clamp_config(config: &mut AppConfig) {
    config.page_size = config.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
    if !config.append_threshold_px.is_finite() || config.append_threshold_px < 0.0 {
        config.append_threshold_px = default_append_threshold_px();
    }
    config.backend_url = config.backend_url.trim().trim_end_matches('/').to_string();
    if config.backend_url.is_empty() {
        config.backend_url = default_backend_url();
    }
}

/// Smallest useful catalog page.
pub const MIN_PAGE_SIZE: usize = 1;
/// Largest catalog page the backend will serve in one response.
pub const MAX_PAGE_SIZE: usize = 200;

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_page_size() -> usize {
    30
}

fn default_append_threshold_px() -> f32 {
    400.0
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("empty config parses");
        assert_eq!(cfg.page_size, 30);
        assert_eq!(cfg.backend_url, "http://127.0.0.1:5000");
        assert_eq!(cfg.log_level, LogLevel::Info);
    }

    #[test]
    fn page_size_is_clamped_to_backend_limits() {
        let mut cfg: AppConfig =
            toml::from_str("page_size = 100000").expect("config parses");
        clamp_config(&mut cfg);
        assert_eq!(cfg.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn backend_url_is_normalized() {
        let mut cfg: AppConfig =
            toml::from_str("backend_url = \" http://localhost:5000/ \"").expect("config parses");
        clamp_config(&mut cfg);
        assert_eq!(cfg.backend_url, "http://localhost:5000");
    }
}
