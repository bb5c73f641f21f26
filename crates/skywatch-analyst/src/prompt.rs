//! Prompt builders for the four narrative sections.

use serde::Serialize;
use skywatch_weather::{AnomalyRecord, CurrentResponse, ForecastResponse};

/// Days of forecast summarised in the forecast prompt
const FORECAST_PROMPT_DAYS: usize = 7;

pub fn current_conditions_prompt(weather: &CurrentResponse) -> String {
    let location = &weather.location;
    let current = &weather.current;

    format!(
        "You are a professional meteorologist analyzing current weather conditions.

Location: {name}, {country}
Local Time: {localtime}

Current Conditions:
- Temperature: {temp}°C (Feels like: {feels}°C)
- Condition: {condition}
- Humidity: {humidity}%
- Wind: {wind} km/h {wind_dir}
- Pressure: {pressure} mb
- Visibility: {vis} km
- UV Index: {uv}
- Cloud Cover: {cloud}%

Provide a professional weather analysis covering:
1. Current conditions summary
2. Comfort level and what to expect
3. Outdoor activity recommendations
4. Any weather concerns or advisories

Keep the analysis concise, practical, and professional (3-4 paragraphs maximum).",
        name = location.name,
        country = location.country,
        localtime = location.localtime,
        temp = current.temp_c,
        feels = current.feelslike_c,
        condition = current.condition.text,
        humidity = current.humidity,
        wind = current.wind_kph,
        wind_dir = current.wind_dir,
        pressure = current.pressure_mb,
        vis = current.vis_km,
        uv = current.uv,
        cloud = current.cloud,
    )
}

#[derive(Serialize)]
struct DaySummary {
    date: String,
    condition: Option<String>,
    max_temp: f64,
    min_temp: f64,
    precipitation: f64,
    max_wind: f64,
    uv: Option<f64>,
}

pub fn forecast_prompt(forecast: &ForecastResponse) -> String {
    let summary: Vec<DaySummary> = forecast
        .detailed_days()
        .into_iter()
        .take(FORECAST_PROMPT_DAYS)
        .map(|d| DaySummary {
            date: d.date.to_string(),
            condition: d.day.condition.map(|c| c.text),
            max_temp: d.day.maxtemp_c,
            min_temp: d.day.mintemp_c,
            precipitation: d.day.totalprecip_mm,
            max_wind: d.day.maxwind_kph,
            uv: d.day.uv,
        })
        .collect();

    let summary_json = serde_json::to_string_pretty(&summary).unwrap_or_default();

    format!(
        "You are a professional meteorologist providing a comprehensive {days}-day weather forecast analysis.

Location: {location}

{days}-Day Forecast:
{summary_json}

Provide a detailed forecast analysis covering:
1. Week overview and general weather trends
2. Key weather patterns and changes expected
3. Best days for outdoor activities
4. Days requiring weather precautions
5. Temperature trends and what they mean
6. Precipitation and wind patterns

Keep the analysis informative, actionable, and professional (4-5 paragraphs maximum).",
        days = summary.len(),
        location = forecast.location.display_name(),
    )
}

/// One line per anomaly, or a fixed sentence when there are none.
pub fn anomaly_summary(anomalies: &[AnomalyRecord]) -> String {
    if anomalies.is_empty() {
        return "No significant anomalies detected".to_string();
    }

    anomalies
        .iter()
        .map(|a| {
            format!(
                "- {}: {} (Severity: {})",
                a.kind.label(),
                a.description,
                a.severity
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn insights_prompt(weather: &CurrentResponse, anomalies: &[AnomalyRecord]) -> String {
    format!(
        "You are a weather intelligence analyst providing expert insights.

Location: {location}
Current Temperature: {temp}°C
Current Condition: {condition}

Detected Weather Anomalies:
{summary}

Provide expert weather insights covering:
1. Significance of current conditions
2. Analysis of detected anomalies
3. Potential impacts on daily activities
4. Recommendations and precautions
5. What to expect in the coming hours

Be concise, actionable, and focus on practical guidance (3-4 paragraphs).",
        location = weather.location.display_name(),
        temp = weather.current.temp_c,
        condition = weather.current.condition.text,
        summary = anomaly_summary(anomalies),
    )
}

pub fn activity_prompt(weather: &CurrentResponse) -> String {
    let current = &weather.current;
    format!(
        "Based on these current weather conditions, suggest 5 suitable activities:

Temperature: {temp}°C
Condition: {condition}
Wind: {wind} km/h
UV Index: {uv}
Humidity: {humidity}%

Provide 5 specific, practical activity recommendations that are well-suited for these conditions.
Format: Brief activity name followed by 1-sentence explanation.
Mix indoor and outdoor suggestions based on conditions.",
        temp = current.temp_c,
        condition = current.condition.text,
        wind = current.wind_kph,
        uv = current.uv,
        humidity = current.humidity,
    )
}
