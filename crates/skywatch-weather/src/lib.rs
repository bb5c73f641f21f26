//! Weather data for Skywatch.
//!
//! WeatherAPI.com client, forecast cache, and the anomaly evaluator that
//! flags unusual days in a multi-day forecast.

pub mod anomaly;
pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use anomaly::{
    evaluate, AnomalyKind, AnomalyRecord, Severity, ThresholdConfig, UV_EXTREME_THRESHOLD,
};
pub use cache::ForecastCache;
pub use client::WeatherApiClient;
pub use error::WeatherError;
pub use types::*;
