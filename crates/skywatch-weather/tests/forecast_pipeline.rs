//! End-to-end tests: fetch a forecast from a mock WeatherAPI server, adapt
//! it, and run the anomaly evaluator.

use std::time::Duration;

use chrono::NaiveDate;
use skywatch_weather::{
    evaluate, AnomalyKind, ForecastCache, ForecastResponse, Severity, ThresholdConfig,
    WeatherApiClient,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day(date: &str, avg: f64, wind: f64, precip: f64, uv: f64) -> serde_json::Value {
    serde_json::json!({
        "date": date,
        "day": {
            "maxtemp_c": avg + 3.0,
            "mintemp_c": avg - 3.0,
            "avgtemp_c": avg,
            "maxwind_kph": wind,
            "totalprecip_mm": precip,
            "daily_chance_of_rain": 20,
            "condition": { "text": "Sunny", "code": 1000 },
            "uv": uv
        },
        "astro": { "sunrise": "05:00 AM", "sunset": "09:00 PM" }
    })
}

fn forecast_body(days: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "Denver",
            "region": "Colorado",
            "country": "United States of America",
            "lat": 39.74,
            "lon": -104.98,
            "tz_id": "America/Denver",
            "localtime": "2024-07-01 09:00"
        },
        "forecast": { "forecastday": days }
    })
}

async fn serve_forecast(days: Vec<serde_json::Value>) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "Denver"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(days)))
        .mount(&mock_server)
        .await;

    mock_server
}

fn client(server: &MockServer) -> WeatherApiClient {
    WeatherApiClient::with_base_url("test_key", &server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_forecast_to_anomalies() {
    let mock_server = serve_forecast(vec![
        day("2024-07-01", 22.0, 18.0, 0.0, 7.0),
        day("2024-07-02", 24.0, 64.6, 2.0, 9.0),
        day("2024-07-03", 12.0, 20.0, 58.04, 3.0),
    ])
    .await;

    let forecast = client(&mock_server).forecast("Denver", 3).await.unwrap();
    let anomalies = evaluate(&forecast.evaluation_days(), &ThresholdConfig::default());

    let summary: Vec<(AnomalyKind, NaiveDate, Severity)> = anomalies
        .iter()
        .map(|a| (a.kind, a.date, a.severity))
        .collect();

    let jul = |d| NaiveDate::from_ymd_opt(2024, 7, d).unwrap();
    assert_eq!(
        summary,
        vec![
            (AnomalyKind::HighWind, jul(2), Severity::High),
            (AnomalyKind::ExtremeUv, jul(2), Severity::Medium),
            (AnomalyKind::TemperatureAnomaly, jul(3), Severity::Medium),
            (AnomalyKind::HeavyPrecipitation, jul(3), Severity::High),
        ]
    );
    assert_eq!(anomalies[0].description, "Maximum wind speed: 65 km/h");
    assert_eq!(anomalies[2].description, "Temperature deviation: 12.0C (avg: 19.3C)");
    assert_eq!(anomalies[3].description, "Total precipitation: 58.0 mm");
}

#[tokio::test]
async fn test_malformed_day_does_not_hide_other_alerts() {
    let mut broken = day("2024-07-02", 24.0, 90.0, 0.0, 2.0);
    broken["day"]["avgtemp_c"] = serde_json::json!("n/a");

    let mock_server = serve_forecast(vec![
        day("2024-07-01", 22.0, 70.0, 0.0, 2.0),
        broken,
        day("2024-07-03", 21.0, 10.0, 0.0, 2.0),
    ])
    .await;

    let forecast = client(&mock_server).forecast("Denver", 3).await.unwrap();
    assert_eq!(forecast.forecast_days().iter().filter(|d| d.is_err()).count(), 1);

    let anomalies = evaluate(&forecast.evaluation_days(), &ThresholdConfig::default());

    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].kind, AnomalyKind::HighWind);
    assert_eq!(anomalies[0].date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
}

#[tokio::test]
async fn test_empty_forecast_yields_no_anomalies() {
    let mock_server = serve_forecast(Vec::new()).await;

    let forecast = client(&mock_server).forecast("Denver", 1).await.unwrap();
    let anomalies = evaluate(&forecast.evaluation_days(), &ThresholdConfig::default());

    assert!(anomalies.is_empty());
}

#[tokio::test]
async fn test_cached_forecast_evaluates_identically() {
    let mock_server = serve_forecast(vec![
        day("2024-07-01", 22.0, 55.0, 0.0, 9.5),
        day("2024-07-02", 10.0, 10.0, 0.0, 2.0),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let key = ForecastCache::forecast_key("Denver", 2);

    let fetched = client(&mock_server).forecast("Denver", 2).await.unwrap();
    let mut cache = ForecastCache::open(dir.path(), Duration::from_secs(600));
    cache.put(&key, &fetched).unwrap();

    let reopened = ForecastCache::open(dir.path(), Duration::from_secs(600));
    let cached: ForecastResponse = reopened.get(&key).unwrap();

    let config = ThresholdConfig::default();
    assert_eq!(
        evaluate(&cached.evaluation_days(), &config),
        evaluate(&fetched.evaluation_days(), &config)
    );
}
