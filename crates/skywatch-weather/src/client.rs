//! WeatherAPI.com client.

use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use crate::error::WeatherError;
use crate::types::{AstronomyResponse, CurrentResponse, ForecastResponse, LocationMatch};

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Longest forecast the API serves
pub const MAX_FORECAST_DAYS: u8 = 14;

// WeatherAPI.com error codes
const CODE_NO_LOCATION: i32 = 1006;
const CODE_QUOTA_EXCEEDED: i32 = 2007;

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: i32,
    message: String,
}

pub struct WeatherApiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherApiClient {
    /// Client against `base_url` (the public API, a proxy, or a test server).
    pub fn with_base_url(
        api_key: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, name: &str, location: &str) -> String {
        format!(
            "{}/{}.json?key={}&q={}",
            self.base_url,
            name,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(location),
        )
    }

    /// Send a GET. The URL carries the API key, so it is stripped from transport errors.
    async fn get(&self, url: &str) -> Result<reqwest::Response, WeatherError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| WeatherError::NetworkError(e.without_url()))
    }

    /// Search for locations matching a free-text query.
    #[instrument(skip(self), level = "info")]
    pub async fn search_locations(&self, query: &str) -> Result<Vec<LocationMatch>, WeatherError> {
        let url = self.endpoint("search", query);
        let response = self.get(&url).await?;
        self.handle_response(response).await
    }

    /// Current conditions, including air quality.
    #[instrument(skip(self), level = "info")]
    pub async fn current(&self, location: &str) -> Result<CurrentResponse, WeatherError> {
        let url = format!("{}&aqi=yes", self.endpoint("current", location));
        let response = self.get(&url).await?;
        self.handle_response(response).await
    }

    /// Multi-day forecast. `days` is clamped to 1..=14.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(
        &self,
        location: &str,
        days: u8,
    ) -> Result<ForecastResponse, WeatherError> {
        let days = days.clamp(1, MAX_FORECAST_DAYS);
        let url = format!(
            "{}&days={}&aqi=yes&alerts=yes",
            self.endpoint("forecast", location),
            days
        );
        let response = self.get(&url).await?;
        let forecast: ForecastResponse = self.handle_response(response).await?;

        tracing::debug!(
            "Received {} forecast days for {}",
            forecast.forecast.forecastday.len(),
            forecast.location.name
        );
        Ok(forecast)
    }

    /// Sunrise, sunset and moon data for a date.
    #[instrument(skip(self), level = "info")]
    pub async fn astronomy(
        &self,
        location: &str,
        date: NaiveDate,
    ) -> Result<AstronomyResponse, WeatherError> {
        let url = format!(
            "{}&dt={}",
            self.endpoint("astronomy", location),
            date.format("%Y-%m-%d")
        );
        let response = self.get(&url).await?;
        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, WeatherError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| WeatherError::Parse(format!("JSON parse error: {}", e.without_url())));
        }

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(WeatherError::RateLimited(retry_after));
        }

        if status.is_server_error() {
            tracing::warn!("Weather API returned {}", status);
            return Err(WeatherError::ServiceUnavailable);
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .map(|body| body.error);

        match (status.as_u16(), detail) {
            (_, Some(d)) if d.code == CODE_NO_LOCATION => Err(WeatherError::LocationNotFound(d.message)),
            (_, Some(d)) if d.code == CODE_QUOTA_EXCEEDED => {
                Err(WeatherError::RateLimited(DEFAULT_RETRY_AFTER_SECS))
            }
            (401 | 403, _) => Err(WeatherError::InvalidApiKey),
            (_, Some(d)) => Err(WeatherError::ApiError(format!("{}: {}", status, d.message))),
            (_, None) => Err(WeatherError::ApiError(format!("{}: {}", status, text))),
        }
    }
}
