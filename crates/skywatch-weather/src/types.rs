use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::MalformedDayRecord;

/// One day of a forecast horizon, as seen by the anomaly evaluator.
///
/// `D` is any date representation; the WeatherAPI adapter produces `NaiveDate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay<D = NaiveDate> {
    pub date: D,
    pub avg_temp_c: f64,
    pub max_wind_kph: f64,
    pub total_precip_mm: f64,
    /// Missing means 0
    #[serde(default)]
    pub uv_index: Option<f64>,
}

impl<D> ForecastDay<D> {
    pub fn new(date: D, avg_temp_c: f64, max_wind_kph: f64, total_precip_mm: f64) -> Self {
        Self {
            date,
            avg_temp_c,
            max_wind_kph,
            total_precip_mm,
            uv_index: None,
        }
    }

    pub fn with_uv(mut self, uv_index: f64) -> Self {
        self.uv_index = Some(uv_index);
        self
    }

    /// UV index with the missing-value default applied
    pub fn uv_or_zero(&self) -> f64 {
        self.uv_index.unwrap_or(0.0)
    }

    /// True when every numeric field is a finite number
    pub fn is_well_formed(&self) -> bool {
        self.avg_temp_c.is_finite()
            && self.max_wind_kph.is_finite()
            && self.total_precip_mm.is_finite()
            && self.uv_index.map_or(true, f64::is_finite)
    }
}

// Only the fields the evaluator needs; everything else in the day is ignored
#[derive(Deserialize)]
struct WireDay {
    date: NaiveDate,
    day: WireDayStats,
}

#[derive(Deserialize)]
struct WireDayStats {
    avgtemp_c: f64,
    maxwind_kph: f64,
    totalprecip_mm: f64,
    #[serde(default)]
    uv: Option<f64>,
}

impl ForecastDay<NaiveDate> {
    /// Adapt one entry of the provider's `forecastday` array.
    ///
    /// `avgtemp_c`, `maxwind_kph`, `totalprecip_mm` and `uv` map straight onto
    /// the evaluator fields with no unit conversion.
    pub fn from_api_value(
        index: usize,
        value: &serde_json::Value,
    ) -> Result<Self, MalformedDayRecord> {
        let wire = WireDay::deserialize(value).map_err(|e| MalformedDayRecord {
            index,
            reason: e.to_string(),
        })?;

        Ok(Self {
            date: wire.date,
            avg_temp_c: wire.day.avgtemp_c,
            max_wind_kph: wire.day.maxwind_kph,
            total_precip_mm: wire.day.totalprecip_mm,
            uv_index: wire.day.uv,
        })
    }
}

/// Location block shared by the WeatherAPI.com responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLocation {
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCondition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub code: i32,
}

/// Current conditions block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCurrent {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub condition: ApiCondition,
    pub humidity: f64,
    pub wind_kph: f64,
    #[serde(default)]
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub precip_mm: f64,
    pub vis_km: f64,
    pub uv: f64,
    pub cloud: f64,
    #[serde(default)]
    pub last_updated: String,
}

/// Response of `current.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub location: ApiLocation,
    pub current: ApiCurrent,
}

/// Response of `forecast.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub location: ApiLocation,
    #[serde(default)]
    pub current: Option<ApiCurrent>,
    pub forecast: ApiForecast,
}

/// Days are kept as raw JSON so one bad entry cannot fail the whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiForecast {
    #[serde(default)]
    pub forecastday: Vec<serde_json::Value>,
}

/// Daily aggregate block of a forecast day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDay {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub maxwind_kph: f64,
    pub totalprecip_mm: f64,
    #[serde(default)]
    pub avghumidity: Option<f64>,
    #[serde(default)]
    pub daily_chance_of_rain: Option<f64>,
    #[serde(default)]
    pub condition: Option<ApiCondition>,
    #[serde(default)]
    pub uv: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiAstro {
    #[serde(default)]
    pub sunrise: String,
    #[serde(default)]
    pub sunset: String,
    #[serde(default)]
    pub moonrise: String,
    #[serde(default)]
    pub moonset: String,
    #[serde(default)]
    pub moon_phase: String,
}

/// Fully typed forecast day, used for tables and prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiForecastDay {
    pub date: NaiveDate,
    pub day: ApiDay,
    #[serde(default)]
    pub astro: Option<ApiAstro>,
}

/// Response of `astronomy.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AstronomyResponse {
    pub location: ApiLocation,
    pub astronomy: ApiAstronomy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAstronomy {
    pub astro: ApiAstro,
}

/// One hit from `search.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationMatch {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl ApiLocation {
    /// "Name, Country" for headers and prompts
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

impl ForecastResponse {
    /// Adapt every forecast day, keeping per-day failures.
    pub fn forecast_days(&self) -> Vec<Result<ForecastDay, MalformedDayRecord>> {
        self.forecast
            .forecastday
            .iter()
            .enumerate()
            .map(|(index, value)| ForecastDay::from_api_value(index, value))
            .collect()
    }

    /// Days ready for the anomaly evaluator. Malformed days are logged and skipped.
    pub fn evaluation_days(&self) -> Vec<ForecastDay> {
        self.forecast_days()
            .into_iter()
            .filter_map(|day| match day {
                Ok(day) => Some(day),
                Err(e) => {
                    tracing::warn!("Skipping forecast day: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Fully typed days for display. Days missing display fields are skipped.
    pub fn detailed_days(&self) -> Vec<ApiForecastDay> {
        self.forecast
            .forecastday
            .iter()
            .filter_map(|value| match ApiForecastDay::deserialize(value) {
                Ok(day) => Some(day),
                Err(e) => {
                    tracing::debug!("Forecast day not displayable: {}", e);
                    None
                }
            })
            .collect()
    }
}
