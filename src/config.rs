//! Configuration management for the weathernews application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherNewsError;
use crate::models::Coordinates;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the weathernews application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// News API configuration
    #[serde(default)]
    pub news: NewsConfig,
    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Position request settings
    #[serde(default)]
    pub location: LocationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Settings store location
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// News API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    /// NewsAPI key
    pub api_key: Option<String>,
    /// Base URL for the news API
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// Two letter country code for top headlines
    #[serde(default = "default_news_country")]
    pub country: String,
    /// Number of headlines requested per fetch
    #[serde(default = "default_news_page_size")]
    pub page_size: u32,
}

/// HTTP client settings shared by all upstream calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient failures
    #[serde(default = "default_http_max_retries")]
    pub max_retries: u32,
}

/// Position request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// How long to wait for a fix, in seconds
    #[serde(default = "default_location_timeout")]
    pub timeout_seconds: u32,
    /// Age of a cached fix that is still accepted, in seconds
    #[serde(default = "default_location_maximum_age")]
    pub maximum_age_seconds: u32,
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,
    /// Fixed latitude used as the device position
    pub latitude: Option<f64>,
    /// Fixed longitude used as the device position
    pub longitude: Option<f64>,
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
}

/// Settings store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the key-value store holding user settings
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

// Default value functions
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_news_country() -> String {
    "us".to_string()
}

fn default_news_page_size() -> u32 {
    50
}

fn default_http_timeout() -> u32 {
    10
}

fn default_http_max_retries() -> u32 {
    2
}

fn default_location_timeout() -> u32 {
    15
}

fn default_location_maximum_age() -> u32 {
    10
}

fn default_high_accuracy() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_settings_path() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("weathernews").join("settings"))
        .unwrap_or_else(|| PathBuf::from(".weathernews/settings"))
        .to_string_lossy()
        .into_owned()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_news_base_url(),
            country: default_news_country(),
            page_size: default_news_page_size(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_http_timeout(),
            max_retries: default_http_max_retries(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_location_timeout(),
            maximum_age_seconds: default_location_maximum_age(),
            high_accuracy: default_high_accuracy(),
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: default_settings_path(),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl LocationConfig {
    /// Configured device position, when both components are set
    #[must_use]
    pub fn fixed_position(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
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

        // WEATHERNEWS_NEWS__API_KEY -> news.api_key
        builder = builder.add_source(
            Environment::with_prefix("WEATHERNEWS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weathernews").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.news.base_url.is_empty() {
            self.news.base_url = default_news_base_url();
        }
        if self.news.country.is_empty() {
            self.news.country = default_news_country();
        }
        if self.news.page_size == 0 {
            self.news.page_size = default_news_page_size();
        }
        if self.http.timeout_seconds == 0 {
            self.http.timeout_seconds = default_http_timeout();
        }
        if self.location.timeout_seconds == 0 {
            self.location.timeout_seconds = default_location_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.storage.settings_path.is_empty() {
            self.storage.settings_path = default_settings_path();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_position()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        for (name, key) in [
            ("Weather", &self.weather.api_key),
            ("News", &self.news.api_key),
        ] {
            if let Some(api_key) = key {
                if api_key.trim().is_empty() {
                    return Err(WeatherNewsError::config(format!(
                        "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }

                if api_key.len() > 100 {
                    return Err(WeatherNewsError::config(format!(
                        "{name} API key appears to be invalid (too long). Please check your API key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.timeout_seconds > 300 {
            return Err(WeatherNewsError::config("HTTP timeout cannot exceed 300 seconds").into());
        }

        if self.http.max_retries > 10 {
            return Err(WeatherNewsError::config("HTTP max retries cannot exceed 10").into());
        }

        if self.news.page_size > 100 {
            return Err(WeatherNewsError::config("News page size cannot exceed 100").into());
        }

        if self.location.timeout_seconds > 120 {
            return Err(
                WeatherNewsError::config("Location timeout cannot exceed 120 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherNewsError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherNewsError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Weather", &self.weather.base_url),
            ("News", &self.news.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherNewsError::config(format!(
                    "{name} API base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.news.country.len() != 2 || !self.news.country.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(WeatherNewsError::config(format!(
                "Invalid news country '{}'. Must be a two letter country code",
                self.news.country
            ))
            .into());
        }

        Ok(())
    }

    /// Validate the configured device position
    fn validate_position(&self) -> Result<()> {
        match (self.location.latitude, self.location.longitude) {
            (None, None) => Ok(()),
            (Some(lat), Some(lon)) => {
                if Coordinates::new(lat, lon).is_valid() {
                    Ok(())
                } else {
                    Err(WeatherNewsError::config(format!(
                        "Configured position ({lat}, {lon}) is out of range"
                    ))
                    .into())
                }
            }
            _ => Err(WeatherNewsError::config(
                "Both location.latitude and location.longitude must be set together",
            )
            .into()),
        }
    }
}
