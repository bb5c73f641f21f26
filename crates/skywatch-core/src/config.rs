use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the WeatherAPI.com key
pub const WEATHER_API_KEY_ENV: &str = "WEATHERAPI_KEY";
/// Environment variable holding the Gemini key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Longest horizon the forecast endpoint serves
pub const MAX_FORECAST_DAYS: u8 = 14;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Whether an upstream service has usable credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Configured,
    NotConfigured,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Configured => write!(f, "Configured"),
            ServiceStatus::NotConfigured => write!(f, "Not Configured"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding config.toml and the weather cache
    #[serde(skip, default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Narrative analyst settings
    #[serde(default)]
    pub analyst: AnalystConfig,

    /// Anomaly alert thresholds
    #[serde(default)]
    pub alerts: AlertConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// WeatherAPI.com key. Normally supplied through WEATHERAPI_KEY and never written to disk.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Location used when none is given on the command line
    #[serde(default = "default_location")]
    pub default_location: String,

    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    /// Cache lifetime in seconds (0 disables caching)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_weather_base_url() -> String {
    "http://api.weatherapi.com/v1".to_string()
}

fn default_location() -> String {
    "London".to_string()
}

fn default_forecast_days() -> u8 {
    7
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            default_location: default_location(),
            forecast_days: default_forecast_days(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    /// Check if the key is set and not the sample placeholder
    pub fn is_configured(&self) -> bool {
        is_real_key(&self.api_key, "your_weatherapi_key_here")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// Gemini key. Normally supplied through GEMINI_API_KEY and never written to disk.
    #[serde(default, skip_serializing)]
    pub api_key: String,

    #[serde(default = "default_analyst_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature passed to the model
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_analyst_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_temperature() -> f64 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    1000
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_analyst_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl AnalystConfig {
    /// Check if the key is set and not the sample placeholder
    pub fn is_configured(&self) -> bool {
        is_real_key(&self.api_key, "your_gemini_api_key_here")
    }
}

/// Thresholds for forecast anomaly alerts.
///
/// The extreme UV threshold is fixed and deliberately absent here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Allowed deviation from the horizon average temperature, degrees Celsius
    #[serde(default = "default_temp_anomaly_threshold")]
    pub temp_anomaly_threshold_c: f64,

    #[serde(default = "default_wind_speed_alert")]
    pub wind_speed_alert_kph: f64,

    #[serde(default = "default_precipitation_alert")]
    pub precipitation_alert_mm: f64,
}

fn default_temp_anomaly_threshold() -> f64 {
    5.0
}

fn default_wind_speed_alert() -> f64 {
    50.0
}

fn default_precipitation_alert() -> f64 {
    50.0
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            temp_anomaly_threshold_c: default_temp_anomaly_threshold(),
            wind_speed_alert_kph: default_wind_speed_alert(),
            precipitation_alert_mm: default_precipitation_alert(),
        }
    }
}

fn is_real_key(key: &str, placeholder: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != placeholder
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skywatch")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            weather: WeatherConfig::default(),
            analyst: AnalystConfig::default(),
            alerts: AlertConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the user config directory, creating a default
    /// file if none exists, then apply API keys from the environment.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit file path.
    ///
    /// A missing file is created with defaults. Environment overrides are not applied.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        if !path.exists() {
            let config = Self {
                config_dir,
                ..Self::default()
            };
            config.save_to(path)?;
            tracing::info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;
        config.config_dir = config_dir;

        Ok(config)
    }

    /// Apply API keys from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply API keys from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.weather.api_key = key.trim().to_string();
        }
        if let Some(key) = lookup(GEMINI_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.analyst.api_key = key.trim().to_string();
        }
    }

    /// Credential status for each upstream service, in display order.
    pub fn service_status(&self) -> Vec<(&'static str, ServiceStatus)> {
        let status = |configured: bool| {
            if configured {
                ServiceStatus::Configured
            } else {
                ServiceStatus::NotConfigured
            }
        };
        vec![
            ("Weather API", status(self.weather.is_configured())),
            ("Gemini AI", status(self.analyst.is_configured())),
        ]
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !self.weather.is_configured() {
            result.add_error(
                "weather.api_key",
                format!("{} is not configured", WEATHER_API_KEY_ENV),
            );
        }

        // Narratives degrade to a notice without a key
        if !self.analyst.is_configured() {
            result.add_warning(
                "analyst.api_key",
                format!(
                    "{} is not configured - AI analysis will be unavailable",
                    GEMINI_API_KEY_ENV
                ),
            );
        }

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.analyst.base_url, "analyst.base_url", &mut result);

        if self.weather.forecast_days == 0 || self.weather.forecast_days > MAX_FORECAST_DAYS {
            result.add_error(
                "weather.forecast_days",
                format!(
                    "Forecast days must be between 1 and {}, got {}",
                    MAX_FORECAST_DAYS, self.weather.forecast_days
                ),
            );
        }

        if self.weather.cache_ttl_secs == 0 {
            result.add_warning("weather.cache_ttl_secs", "Weather cache disabled (0 seconds)");
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if !(0.0..=2.0).contains(&self.analyst.temperature) {
            result.add_warning(
                "analyst.temperature",
                format!(
                    "Temperature {} is outside the usual 0.0-2.0 range",
                    self.analyst.temperature
                ),
            );
        }

        let thresholds = [
            ("alerts.temp_anomaly_threshold_c", self.alerts.temp_anomaly_threshold_c),
            ("alerts.wind_speed_alert_kph", self.alerts.wind_speed_alert_kph),
            ("alerts.precipitation_alert_mm", self.alerts.precipitation_alert_mm),
        ];
        for (field, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                result.add_error(
                    field,
                    format!("Threshold must be a non-negative number, got {}", value),
                );
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a file. API keys are never written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skywatch");

        Ok(config_dir.join("config.toml"))
    }
}
