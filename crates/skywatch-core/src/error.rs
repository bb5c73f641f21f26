//! Application error hierarchy.
//!
//! The weather and analyst crates keep their own error enums; the binary folds
//! them into [`AppError`] before anything reaches the terminal. `Display` keeps
//! the technical detail for logs, `user_message()` is what gets printed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("network: {0}")]
    Network(#[from] NetworkError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("weather provider: {0}")]
    Weather(#[from] WeatherError),

    #[error("analyst: {0}")]
    Analyst(#[from] AnalystError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Analyst(e) => e.user_message(),
            AppError::Io(_) => "Could not read or write local Skywatch files.",
            AppError::Other(_) => "Something went wrong. Run with RUST_LOG=debug for details.",
        }
    }
}

/// Transport failures shared by both upstream services.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("timed out")]
    Timeout,

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("undecodable payload: {0}")]
    BadPayload(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::Unreachable(_) => "Could not reach the service. Are you online?",
            NetworkError::Timeout => "The service took too long to answer.",
            NetworkError::HttpStatus { status, .. } if *status >= 500 => {
                "The service is having problems right now."
            }
            NetworkError::HttpStatus { .. } => "The service rejected the request.",
            NetworkError::BadPayload(_) => "The service sent data Skywatch could not read.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot load config: {0}")]
    Load(String),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Load(_) => "The Skywatch config file could not be loaded.",
            ConfigError::Invalid(_) => "Some settings are missing or invalid.",
        }
    }
}

/// Provider failures as shown on the dashboard.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no match for location {0:?}")]
    LocationNotFound(String),

    #[error("{0}")]
    ApiError(String),

    #[error("key rejected")]
    InvalidApiKey,

    #[error("quota exceeded, retry in {0}s")]
    RateLimited(u64),

    #[error("provider down")]
    ServiceUnavailable,

    #[error("cache: {0}")]
    CacheError(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound(_) => {
                "No such location. Try `skywatch --search <name>` to find one."
            }
            WeatherError::ApiError(_) => "WeatherAPI returned an error.",
            WeatherError::InvalidApiKey => "WeatherAPI rejected the key in WEATHERAPI_KEY.",
            WeatherError::RateLimited(_) => "WeatherAPI quota reached. Try again shortly.",
            WeatherError::ServiceUnavailable => "WeatherAPI is unavailable at the moment.",
            WeatherError::CacheError(_) => "The local weather cache could not be used.",
        }
    }
}

/// Narrative failures as shown on the dashboard.
#[derive(Debug, Error)]
pub enum AnalystError {
    #[error("no Gemini key")]
    NotConfigured,

    #[error("key rejected")]
    InvalidApiKey,

    #[error("quota exceeded, retry in {0}s")]
    RateLimited(u64),

    #[error("blocked ({0})")]
    Blocked(String),

    #[error("{0}")]
    ApiError(String),
}

impl AnalystError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AnalystError::NotConfigured => {
                "Gemini AI not configured. Set GEMINI_API_KEY to enable AI insights."
            }
            AnalystError::InvalidApiKey => "Gemini rejected the key in GEMINI_API_KEY.",
            AnalystError::RateLimited(_) => "Gemini quota reached. Try again shortly.",
            AnalystError::Blocked(_) => "Gemini declined to analyze this data.",
            AnalystError::ApiError(_) => "Gemini could not produce an analysis.",
        }
    }
}
