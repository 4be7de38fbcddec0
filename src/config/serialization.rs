//! Config serialization to TOML
//!
//! Single source of truth for the config file format; `ensure_config_exists`
//! and `philo config --reset` both write this output.

use super::Config;

impl Config {
    /// Serialize config to a commented TOML document
    pub fn to_toml(&self) -> String {
        let referer = match &self.referer {
            Some(referer) => format!("referer = {:?}", referer),
            None => "# referer = \"https://example.com\"".to_string(),
        };

        format!(
            r#"# philo configuration
# Environment variables (PHILO_*) override values in this file.

# Chat completions endpoint (env: PHILO_API_URL)
api_url = {api_url:?}

# Model identifier sent with every request (env: PHILO_MODEL)
model = {model:?}

# Provider preference order (env: PHILO_PROVIDER, comma-separated)
provider_order = {providers:?}

# Client title sent as X-Title (env: PHILO_TITLE)
app_title = {title:?}

# Optional HTTP-Referer header (env: PHILO_REFERER)
{referer}

# Directory for downloaded conversations (env: PHILO_EXPORT_DIR)
export_dir = {export_dir:?}

# Logging configuration (RUST_LOG env var overrides level)
[logging]
level = {level:?}              # trace, debug, info, warn, error
file_enabled = {file_enabled}         # Write JSON logs to files
file_dir = {file_dir:?}
file_rotation = {rotation:?}    # hourly, daily, never
file_prefix = {prefix:?}
"#,
            api_url = self.api_url,
            model = self.model,
            providers = self.provider_order,
            title = self.app_title,
            referer = referer,
            export_dir = self.export_dir.display().to_string(),
            level = self.logging.level,
            file_enabled = self.logging.file_enabled,
            file_dir = self.logging.file_dir.display().to_string(),
            rotation = self.logging.file_rotation.as_str(),
            prefix = self.logging.file_prefix,
        )
    }

    /// Save current configuration to the config file
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::config_path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            ));
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml())
    }
}
