//! Conversion of crate-level errors into the application error hierarchy.

use skywatch_analyst::AnalystError as AnalystCrateError;
use skywatch_core::{AnalystError, AppError, NetworkError, WeatherError};
use skywatch_weather::WeatherError as WeatherCrateError;

fn network_error(e: reqwest::Error) -> NetworkError {
    // Request URLs can carry an API key
    let e = e.without_url();
    if e.is_timeout() {
        NetworkError::Timeout
    } else if let Some(status) = e.status() {
        NetworkError::HttpStatus {
            status: status.as_u16(),
            message: e.to_string(),
        }
    } else if e.is_decode() {
        NetworkError::BadPayload(e.to_string())
    } else {
        NetworkError::Unreachable(e.to_string())
    }
}

pub fn weather_error(e: WeatherCrateError) -> AppError {
    match e {
        WeatherCrateError::InvalidApiKey => WeatherError::InvalidApiKey.into(),
        WeatherCrateError::LocationNotFound(location) => {
            WeatherError::LocationNotFound(location).into()
        }
        WeatherCrateError::RateLimited(secs) => WeatherError::RateLimited(secs).into(),
        WeatherCrateError::ServiceUnavailable => WeatherError::ServiceUnavailable.into(),
        WeatherCrateError::ApiError(msg) => WeatherError::ApiError(msg).into(),
        WeatherCrateError::Parse(msg) => NetworkError::BadPayload(msg).into(),
        WeatherCrateError::Cache(msg) => WeatherError::CacheError(msg).into(),
        WeatherCrateError::NetworkError(e) => network_error(e).into(),
    }
}

pub fn analyst_error(e: AnalystCrateError) -> AppError {
    match e {
        AnalystCrateError::NotConfigured => AnalystError::NotConfigured.into(),
        AnalystCrateError::InvalidApiKey => AnalystError::InvalidApiKey.into(),
        AnalystCrateError::RateLimited(secs) => AnalystError::RateLimited(secs).into(),
        AnalystCrateError::Blocked(reason) => AnalystError::Blocked(reason).into(),
        AnalystCrateError::EmptyResponse => {
            AnalystError::ApiError("model returned no text".to_string()).into()
        }
        AnalystCrateError::ApiError(msg) => AnalystError::ApiError(msg).into(),
        AnalystCrateError::NetworkError(e) => network_error(e).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_errors_map_to_weather_variants() {
        let err = weather_error(WeatherCrateError::LocationNotFound("Atlantis".into()));
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::LocationNotFound(ref l)) if l == "Atlantis"
        ));
        assert!(err.user_message().contains("--search"));

        let err = weather_error(WeatherCrateError::RateLimited(30));
        assert!(matches!(err, AppError::Weather(WeatherError::RateLimited(30))));
    }

    #[test]
    fn test_parse_error_is_bad_payload() {
        let err = weather_error(WeatherCrateError::Parse("expected value".into()));
        assert!(matches!(
            err,
            AppError::Network(NetworkError::BadPayload(_))
        ));
    }

    #[test]
    fn test_analyst_errors() {
        assert!(matches!(
            analyst_error(AnalystCrateError::NotConfigured),
            AppError::Analyst(AnalystError::NotConfigured)
        ));
        assert!(matches!(
            analyst_error(AnalystCrateError::EmptyResponse),
            AppError::Analyst(AnalystError::ApiError(_))
        ));
        assert_eq!(
            analyst_error(AnalystCrateError::InvalidApiKey).user_message(),
            "Gemini rejected the key in GEMINI_API_KEY."
        );
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_network() {
        // Nothing listens on port 9 of the loopback interface
        let e = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .unwrap_err();

        let err = weather_error(WeatherCrateError::NetworkError(e));
        assert!(matches!(err, AppError::Network(_)));
    }

    #[tokio::test]
    async fn test_network_error_text_omits_query_string() {
        let e = reqwest::Client::new()
            .get("http://127.0.0.1:9/current.json?key=SECRET_WEATHER_KEY&q=London")
            .send()
            .await
            .unwrap_err();

        let err = weather_error(WeatherCrateError::NetworkError(e));
        assert!(!err.to_string().contains("SECRET_WEATHER_KEY"), "{}", err);
    }
}
