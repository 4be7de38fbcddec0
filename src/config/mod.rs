//! Configuration for the chat client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/philo/config.toml)
//! 3. Built-in defaults (lowest priority)
//!
//! Command-line flags (`--model`, `--provider`, `--export-dir`) are applied
//! on top of the loaded config for a single run.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod logging;
mod serialization;


pub use logging::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "qwen/qwen3-coder";
const DEFAULT_PROVIDER: &str = "fireworks";
const DEFAULT_TITLE: &str = "Project Philo Interview";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Chat completions endpoint
    pub api_url: String,

    /// Model identifier recorded on sessions and sent with requests
    pub model: String,

    /// Upstream provider preference order
    pub provider_order: Vec<String>,

    /// Client title sent as `X-Title`
    pub app_title: String,

    /// Optional `HTTP-Referer` header
    pub referer: Option<String>,

    /// Where downloaded conversations are written
    pub export_dir: PathBuf,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider_order: vec![DEFAULT_PROVIDER.to_string()],
            app_title: DEFAULT_TITLE.to_string(),
            referer: None,
            export_dir: default_export_dir(),
            logging: LoggingConfig::default(),
        }
    }
}

/// The user's download directory, or the working directory if there is none
fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure (every field optional; missing means default)
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub model: Option<String>,
    pub provider_order: Option<Vec<String>>,
    pub app_title: Option<String>,
    pub referer: Option<String>,
    pub export_dir: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/philo/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("philo").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    /// Called during startup to help users discover configuration options
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        if let Err(e) = std::fs::write(&path, Self::default().to_toml()) {
            tracing::debug!("Could not write config template {}: {}", path.display(), e);
        }
    }

    /// Parse config file contents
    pub(crate) fn parse_file_config(contents: &str) -> Result<FileConfig> {
        toml::from_str(contents).context("Invalid config file")
    }

    /// Load file config if it exists
    ///
    /// A file that exists but cannot be read or parsed is an error: a broken
    /// config should fail loudly rather than silently fall back to defaults.
    fn load_file_config() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => Self::parse_file_config(&contents)
                .with_context(|| format!("Failed to load {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn load() -> Result<Self> {
        let file = Self::load_file_config()?;
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file with environment lookups
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // API URL: env > file > default
        let api_url = env("PHILO_API_URL")
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        // Model: env > file > default
        let model = env("PHILO_MODEL").or(file.model).unwrap_or(defaults.model);

        // Providers: env (comma-separated) > file > default. An empty list
        // counts as unset.
        let provider_order = env("PHILO_PROVIDER")
            .map(|v| parse_provider_list(&v))
            .filter(|list| !list.is_empty())
            .or_else(|| {
                file.provider_order
                    .map(|list| parse_provider_list(&list.join(",")))
                    .filter(|list| !list.is_empty())
            })
            .unwrap_or(defaults.provider_order);

        let app_title = env("PHILO_TITLE")
            .or(file.app_title)
            .unwrap_or(defaults.app_title);

        let referer = env("PHILO_REFERER")
            .or(file.referer)
            .filter(|r| !r.trim().is_empty());

        // Export directory: env > file > default
        let export_dir = env("PHILO_EXPORT_DIR")
            .or(file.export_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        // Logging settings: file only (RUST_LOG is handled by the subscriber)
        let logging = LoggingConfig::from_file(file.logging);

        Self {
            api_url,
            model,
            provider_order,
            app_title,
            referer,
            export_dir,
            logging,
        }
    }
}

/// Split "a, b,,c" into ["a", "b", "c"]
pub(crate) fn parse_provider_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
