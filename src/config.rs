//! Configuration management for `airq`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AirqError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AirqConfig {
    /// Open-Meteo endpoints
    #[serde(default)]
    pub api: ApiConfig,
    /// Model artifact location
    #[serde(default)]
    pub model: ModelConfig,
    /// HTTP service settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Model artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Local path of the serialized regression pipeline
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Remote location fetched on first run when `path` does not exist
    #[serde(default)]
    pub download_url: Option<String>,
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// IANA zone used to render observation times
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP traces endpoint; tracing export is off when unset
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_air_quality_url() -> String {
    "https://air-quality-api.open-meteo.com/v1/air-quality".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_model_path() -> String {
    "assets/aqi_pipeline.json".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_display_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            air_quality_url: default_air_quality_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            download_url: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            display_timezone: default_display_timezone(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl AirqConfig {
    /// Load configuration from `config_path` (or the default location) and
    /// `AIRQ_` environment variables
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // AIRQ_API__TIMEOUT_SECONDS=5 overrides api.timeout_seconds
        builder = builder.add_source(
            Environment::with_prefix("AIRQ")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirqConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("airq").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.api.geocoding_url.is_empty() {
            self.api.geocoding_url = default_geocoding_url();
        }
        if self.api.air_quality_url.is_empty() {
            self.api.air_quality_url = default_air_quality_url();
        }
        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = default_timeout();
        }
        if self.model.path.is_empty() {
            self.model.path = default_model_path();
        }
        if self.model.download_url.as_deref() == Some("") {
            self.model.download_url = None;
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.display_timezone.is_empty() {
            self.server.display_timezone = default_display_timezone();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.logging.otlp_endpoint.as_deref() == Some("") {
            self.logging.otlp_endpoint = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.api.timeout_seconds > 300 {
            return Err(AirqError::config("API timeout cannot exceed 300 seconds").into());
        }

        if self.server.port == 0 {
            return Err(AirqError::config("Server port cannot be 0").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirqError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirqError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Geocoding URL", Some(&self.api.geocoding_url)),
            ("Air quality URL", Some(&self.api.air_quality_url)),
            ("Model download URL", self.model.download_url.as_ref()),
            ("OTLP endpoint", self.logging.otlp_endpoint.as_ref()),
        ];
        for (name, url) in urls {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(AirqError::config(format!(
                        "{name} must be a valid HTTP or HTTPS URL"
                    ))
                    .into());
                }
            }
        }

        self.display_timezone()?;

        Ok(())
    }

    /// Request timeout for outbound calls
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.into())
    }

    /// Parsed display time zone
    pub fn display_timezone(&self) -> Result<Tz> {
        self.server
            .display_timezone
            .parse::<Tz>()
            .map_err(|_| {
                AirqError::config(format!(
                    "Unknown display time zone '{}'",
                    self.server.display_timezone
                ))
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AirqConfig::default();
        assert_eq!(
            config.api.geocoding_url,
            "https://geocoding-api.open-meteo.com/v1/search"
        );
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.model.download_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AirqConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AirqConfig::default();
        config.api.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_bad_urls() {
        let mut config = AirqConfig::default();
        config.model.download_url = Some("ftp://example.com/model.json".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_unknown_timezone() {
        let mut config = AirqConfig::default();
        config.server.display_timezone = "Mars/Olympus_Mons".into();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Unknown display time zone"));
    }

    #[test]
    fn test_apply_defaults_fills_empty_values() {
        let mut config = AirqConfig::default();
        config.api.timeout_seconds = 0;
        config.logging.format = String::new();
        config.model.download_url = Some(String::new());
        config.apply_defaults();
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.logging.format, "pretty");
        assert!(config.model.download_url.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[api]\ntimeout_seconds = 5\n\n[server]\nport = 9000\ndisplay_timezone = \"UTC\""
        )
        .unwrap();

        let config = AirqConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.api.timeout_seconds, 5);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.display_timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = AirqConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("airq"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
