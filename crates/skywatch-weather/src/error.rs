//! Weather-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    #[error("Service unavailable")]
    ServiceUnavailable,

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// A forecast day that could not be adapted into a `ForecastDay`.
///
/// Only that day is skipped; the rest of the forecast is still evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("forecast day {index} is malformed: {reason}")]
pub struct MalformedDayRecord {
    /// Position of the day in the provider's `forecastday` array
    pub index: usize,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_day_display() {
        let err = MalformedDayRecord {
            index: 2,
            reason: "missing field `avgtemp_c`".into(),
        };
        assert_eq!(
            err.to_string(),
            "forecast day 2 is malformed: missing field `avgtemp_c`"
        );
    }
}
