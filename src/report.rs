//! Plain-text dashboard rendering.

use skywatch_core::{AppError, ServiceStatus, ValidationResult};
use skywatch_weather::{
    AnomalyRecord, ApiCurrent, ApiForecastDay, ApiLocation, LocationMatch, Severity,
};

const RULE: &str = "------------------------------------------------------------";

pub struct Narratives {
    pub current: Result<String, AppError>,
    pub forecast: Result<String, AppError>,
    pub activities: Result<String, AppError>,
}

pub struct Dashboard<'a> {
    pub location: &'a ApiLocation,
    pub current: &'a ApiCurrent,
    pub days: &'a [ApiForecastDay],
    pub anomalies: &'a [AnomalyRecord],
    /// `None` when AI output was switched off for the run
    pub narratives: Option<Narratives>,
    /// Only requested when there is at least one anomaly
    pub insights: Option<Result<String, AppError>>,
}

impl Dashboard<'_> {
    pub fn render(&self) -> String {
        let mut sections = vec![
            render_location(self.location, self.days.first()),
            render_current(self.current),
        ];
        if let Some(narratives) = &self.narratives {
            sections.push(render_narratives(narratives));
        }
        sections.push(render_alerts(self.anomalies, self.insights.as_ref()));
        sections.push(render_forecast_table(self.days));
        sections.join("\n")
    }
}

pub fn render_status(statuses: &[(&str, ServiceStatus)]) -> String {
    let mut lines = vec!["API Status".to_string()];
    for (service, status) in statuses {
        let mark = match status {
            ServiceStatus::Configured => "ok",
            ServiceStatus::NotConfigured => "--",
        };
        lines.push(format!("  [{}] {}: {}", mark, service, status));
    }
    lines.join("\n")
}

pub fn render_setup_help(validation: &ValidationResult) -> String {
    let mut lines = vec!["Configuration Required".to_string(), String::new()];
    lines.push("Problems found:".to_string());
    for error in &validation.errors {
        lines.push(format!("  - {}", error));
    }
    lines.extend(
        [
            "",
            "To configure Skywatch:",
            "  1. Create a .env file in the working directory (or export the variables)",
            "  2. Get a WeatherAPI key from https://www.weatherapi.com/signup.aspx",
            "  3. Optionally get a Gemini key from https://aistudio.google.com/app/apikey",
            "",
            "Example .env file:",
            "  WEATHERAPI_KEY=your_actual_weatherapi_key",
            "  GEMINI_API_KEY=your_actual_gemini_key",
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    lines.join("\n")
}

pub fn render_search_results(query: &str, matches: &[LocationMatch]) -> String {
    if matches.is_empty() {
        return format!("No locations found for '{}'", query);
    }
    matches
        .iter()
        .map(|m| {
            if m.region.is_empty() {
                format!("{}, {} ({:.2}, {:.2})", m.name, m.country, m.lat, m.lon)
            } else {
                format!(
                    "{}, {}, {} ({:.2}, {:.2})",
                    m.name, m.region, m.country, m.lat, m.lon
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn heading(title: &str) -> String {
    format!("\n{}\n{}", title, RULE)
}

fn render_location(location: &ApiLocation, today: Option<&ApiForecastDay>) -> String {
    let mut lines = vec![
        heading(&location.display_name()),
        format!(
            "Coordinates: {}, {} | Local time: {} | Timezone: {}",
            location.lat, location.lon, location.localtime, location.tz_id
        ),
    ];
    if let Some(astro) = today.and_then(|d| d.astro.as_ref()) {
        if !astro.moon_phase.is_empty() {
            lines.push(format!("Moon: {}", astro.moon_phase));
        }
    }
    lines.join("\n")
}

fn render_current(current: &ApiCurrent) -> String {
    [
        heading("Current Conditions"),
        format!(
            "Temperature: {}°C (feels like {}°C)   Condition: {}",
            current.temp_c, current.feelslike_c, current.condition.text
        ),
        format!(
            "Humidity: {}%   Wind: {} km/h {}   Pressure: {} mb",
            current.humidity, current.wind_kph, current.wind_dir, current.pressure_mb
        ),
        format!(
            "UV Index: {}   Visibility: {} km   Cloud Cover: {}%   Precipitation: {} mm",
            current.uv, current.vis_km, current.cloud, current.precip_mm
        ),
    ]
    .join("\n")
}

fn narrative_text(result: &Result<String, AppError>) -> String {
    match result {
        Ok(text) => text.trim().to_string(),
        Err(e) => e.user_message().to_string(),
    }
}

fn render_narratives(narratives: &Narratives) -> String {
    [
        heading("AI Weather Analysis"),
        "Current Analysis:".to_string(),
        narrative_text(&narratives.current),
        String::new(),
        "Forecast Analysis:".to_string(),
        narrative_text(&narratives.forecast),
        String::new(),
        "Activity Recommendations:".to_string(),
        narrative_text(&narratives.activities),
    ]
    .join("\n")
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "[HIGH]",
        Severity::Medium => "[MEDIUM]",
        Severity::Low => "[LOW]",
    }
}

fn render_alerts(
    anomalies: &[AnomalyRecord],
    insights: Option<&Result<String, AppError>>,
) -> String {
    let mut lines = vec![heading("Weather Alerts & Anomalies")];

    if anomalies.is_empty() {
        lines.push("No significant anomalies detected".to_string());
        return lines.join("\n");
    }

    for anomaly in anomalies {
        lines.push(format!(
            "{:<8} {} ({})",
            severity_tag(anomaly.severity),
            anomaly.kind.label(),
            anomaly.date
        ));
        lines.push(format!("         {}", anomaly.description));
    }

    if let Some(insights) = insights {
        lines.push(String::new());
        lines.push("AI Insights on Detected Anomalies:".to_string());
        lines.push(narrative_text(insights));
    }

    lines.join("\n")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
        short.push('~');
        short
    }
}

fn render_forecast_table(days: &[ApiForecastDay]) -> String {
    let mut lines = vec![
        heading("Detailed Forecast"),
        format!(
            "{:<10}  {:<20}  {:>6}  {:>6}  {:>7}  {:>5}  {:>6}  {:>4}  {:>8}  {:>8}",
            "Date", "Condition", "Max C", "Min C", "Precip", "Rain", "Wind", "UV", "Sunrise", "Sunset"
        ),
    ];

    for day in days {
        let condition = day
            .day
            .condition
            .as_ref()
            .map(|c| c.text.as_str())
            .unwrap_or("-");
        let rain = day
            .day
            .daily_chance_of_rain
            .map(|r| format!("{:.0}%", r))
            .unwrap_or_else(|| "-".to_string());
        let uv = day
            .day
            .uv
            .map(|u| format!("{:.1}", u))
            .unwrap_or_else(|| "-".to_string());
        let (sunrise, sunset) = day
            .astro
            .as_ref()
            .map(|a| (a.sunrise.as_str(), a.sunset.as_str()))
            .unwrap_or(("-", "-"));

        lines.push(format!(
            "{:<10}  {:<20}  {:>6.1}  {:>6.1}  {:>7.1}  {:>5}  {:>6.1}  {:>4}  {:>8}  {:>8}",
            day.date.to_string(),
            truncate(condition, 20),
            day.day.maxtemp_c,
            day.day.mintemp_c,
            day.day.totalprecip_mm,
            rain,
            day.day.maxwind_kph,
            uv,
            sunrise,
            sunset
        ));
    }

    if days.is_empty() {
        lines.push("No forecast days available".to_string());
    }

    lines.join("\n")
}
