//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `--config <path>` on the command line, or `$MAILSPLIT_CONFIG`
//! 2. `~/.config/mailsplit/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailsplit\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! A missing or unreadable file never aborts a run: stdout carries the
//! framed stream, so configuration problems are only logged, after the
//! logger has been built from the loaded settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Input staging settings.
    pub staging: StagingConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Also append logs to `<cache_dir>/mailsplit.log`.
    pub log_to_file: bool,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

/// Where and how the raw message is buffered before parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Directory for the temporary copy (default: the system temp dir).
    pub dir: Option<PathBuf>,
    /// Copy buffer size in bytes (default: 131072 = 128 KB).
    pub buffer_size: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_to_file: false,
            cache_dir: None,
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            buffer_size: 128 * 1024, // 128 KB
        }
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No config file exists; built-in defaults.
    Defaults,
    /// Read from this file.
    File(PathBuf),
    /// The file exists but could not be used; built-in defaults.
    Rejected { path: PathBuf, reason: String },
}

impl ConfigSource {
    /// Report the outcome. Call once logging is set up.
    pub fn log(&self) {
        match self {
            Self::Defaults => tracing::debug!("No config file, using defaults"),
            Self::File(path) => tracing::info!(path = %path.display(), "Loaded config"),
            Self::Rejected { path, reason } => tracing::warn!(
                path = %path.display(),
                error = %reason,
                "Failed to load config, using defaults"
            ),
        }
    }
}

/// Load configuration from `explicit`, or from the standard locations.
///
/// Falls back to the default configuration if no file is found or on
/// read/parse error. Nothing is logged here: logging is configured from
/// the result, so the caller reports the returned [`ConfigSource`].
pub fn load_config(explicit: Option<&Path>) -> (Config, ConfigSource) {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => config_file_path(),
    };
    match path {
        Some(path) if path.exists() => load_from(path),
        _ => (Config::default(), ConfigSource::Defaults),
    }
}

fn load_from(path: PathBuf) -> (Config, ConfigSource) {
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| format!("read: {e}"))
        .and_then(|contents| {
            toml::from_str::<Config>(&contents).map_err(|e| format!("parse: {e}"))
        });
    match parsed {
        Ok(cfg) => (cfg, ConfigSource::File(path)),
        Err(reason) => (Config::default(), ConfigSource::Rejected { path, reason }),
    }
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILSPLIT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mailsplit").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailsplit")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("mailsplit.log")
}
