//! Threshold-based anomaly detection over a multi-day forecast.
//!
//! Each day is checked against the horizon average temperature and three
//! fixed limits. The evaluator is a pure function: no I/O, no logging, no
//! shared state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::ForecastDay;

/// UV index above which a day is flagged. Not configurable.
pub const UV_EXTREME_THRESHOLD: f64 = 8.0;

/// Alert limits applied by [`evaluate`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Allowed absolute deviation from the horizon average, degrees Celsius
    pub temp_anomaly_threshold_c: f64,
    pub wind_speed_alert_kph: f64,
    pub precipitation_alert_mm: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_anomaly_threshold_c: 5.0,
            wind_speed_alert_kph: 50.0,
            precipitation_alert_mm: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyKind {
    TemperatureAnomaly,
    HighWind,
    HeavyPrecipitation,
    #[serde(rename = "ExtremeUV")]
    ExtremeUv,
}

impl AnomalyKind {
    /// Severity is fixed per kind
    pub fn severity(&self) -> Severity {
        match self {
            Self::TemperatureAnomaly => Severity::Medium,
            Self::HighWind => Severity::High,
            Self::HeavyPrecipitation => Severity::High,
            Self::ExtremeUv => Severity::Medium,
        }
    }

    /// Human-readable title for alert widgets
    pub fn label(&self) -> &'static str {
        match self {
            Self::TemperatureAnomaly => "Temperature Anomaly",
            Self::HighWind => "High Wind Speed",
            Self::HeavyPrecipitation => "Heavy Precipitation",
            Self::ExtremeUv => "Extreme UV Index",
        }
    }
}

/// One flagged condition on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord<D = NaiveDate> {
    pub kind: AnomalyKind,
    pub date: D,
    pub severity: Severity,
    pub description: String,
}

impl<D> AnomalyRecord<D> {
    fn new(kind: AnomalyKind, date: D, description: String) -> Self {
        Self {
            kind,
            date,
            severity: kind.severity(),
            description,
        }
    }
}

/// Flag anomalous days in a forecast.
///
/// Output follows forecast order. Anomalies for the same day appear in the
/// order temperature, wind, precipitation, UV. Days with non-finite values
/// are skipped and do not contribute to the horizon average. An empty
/// forecast yields an empty list.
pub fn evaluate<D: Clone>(
    forecast: &[ForecastDay<D>],
    config: &ThresholdConfig,
) -> Vec<AnomalyRecord<D>> {
    let days: Vec<&ForecastDay<D>> = forecast.iter().filter(|d| d.is_well_formed()).collect();
    if days.is_empty() {
        return Vec::new();
    }

    // Shifted by the first day so identical temperatures average exactly
    let base = days[0].avg_temp_c;
    let horizon_avg_temp =
        base + days.iter().map(|d| d.avg_temp_c - base).sum::<f64>() / days.len() as f64;

    let mut anomalies = Vec::new();
    for day in days {
        check_day(day, horizon_avg_temp, config, &mut anomalies);
    }
    anomalies
}

fn check_day<D: Clone>(
    day: &ForecastDay<D>,
    horizon_avg_temp: f64,
    config: &ThresholdConfig,
    out: &mut Vec<AnomalyRecord<D>>,
) {
    if (day.avg_temp_c - horizon_avg_temp).abs() > config.temp_anomaly_threshold_c {
        out.push(AnomalyRecord::new(
            AnomalyKind::TemperatureAnomaly,
            day.date.clone(),
            format!(
                "Temperature deviation: {:.1}C (avg: {:.1}C)",
                round_half_away(day.avg_temp_c, 1),
                round_half_away(horizon_avg_temp, 1)
            ),
        ));
    }

    if day.max_wind_kph > config.wind_speed_alert_kph {
        out.push(AnomalyRecord::new(
            AnomalyKind::HighWind,
            day.date.clone(),
            format!(
                "Maximum wind speed: {:.0} km/h",
                round_half_away(day.max_wind_kph, 0)
            ),
        ));
    }

    if day.total_precip_mm > config.precipitation_alert_mm {
        out.push(AnomalyRecord::new(
            AnomalyKind::HeavyPrecipitation,
            day.date.clone(),
            format!(
                "Total precipitation: {:.1} mm",
                round_half_away(day.total_precip_mm, 1)
            ),
        ));
    }

    let uv = day.uv_or_zero();
    if uv > UV_EXTREME_THRESHOLD {
        out.push(AnomalyRecord::new(
            AnomalyKind::ExtremeUv,
            day.date.clone(),
            // Debug keeps the wire form of whole values ("9.0", not "9")
            format!("UV Index: {:?}", uv),
        ));
    }
}

// Formatting alone rounds ties to even (60.25 -> "60.2"); descriptions round ties away from zero
fn round_half_away(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &'static str, avg: f64, wind: f64, precip: f64) -> ForecastDay<&'static str> {
        ForecastDay::new(date, avg, wind, precip)
    }

    fn kinds<D>(anomalies: &[AnomalyRecord<D>]) -> Vec<AnomalyKind> {
        anomalies.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn test_scenario_a_quiet_day() {
        let forecast = vec![day("2024-06-01", 20.0, 30.0, 0.0).with_uv(3.0)];
        assert!(evaluate(&forecast, &ThresholdConfig::default()).is_empty());
    }

    #[test]
    fn test_scenario_b_deviation_equal_to_threshold() {
        let forecast = vec![day("d1", 10.0, 0.0, 0.0), day("d2", 20.0, 0.0, 0.0)];
        let config = ThresholdConfig {
            temp_anomaly_threshold_c: 5.0,
            ..ThresholdConfig::default()
        };
        assert!(evaluate(&forecast, &config).is_empty());
    }

    #[test]
    fn test_scenario_c_deviation_above_threshold() {
        let forecast = vec![day("d1", 10.0, 0.0, 0.0), day("d2", 20.0, 0.0, 0.0)];
        let config = ThresholdConfig {
            temp_anomaly_threshold_c: 4.9,
            ..ThresholdConfig::default()
        };
        let anomalies = evaluate(&forecast, &config);

        assert_eq!(
            kinds(&anomalies),
            vec![AnomalyKind::TemperatureAnomaly, AnomalyKind::TemperatureAnomaly]
        );
        assert_eq!(anomalies[0].date, "d1");
        assert_eq!(anomalies[0].severity, Severity::Medium);
        assert_eq!(
            anomalies[0].description,
            "Temperature deviation: 10.0C (avg: 15.0C)"
        );
        assert_eq!(anomalies[1].date, "d2");
    }

    #[test]
    fn test_scenario_d_high_wind() {
        let forecast = vec![day("d1", 15.0, 75.4, 0.0)];
        let anomalies = evaluate(&forecast, &ThresholdConfig::default());

        assert_eq!(kinds(&anomalies), vec![AnomalyKind::HighWind]);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert!(anomalies[0].description.contains("75 km/h"));
    }

    #[test]
    fn test_scenario_e_heavy_precipitation() {
        let forecast = vec![day("d1", 15.0, 10.0, 60.25)];
        let anomalies = evaluate(&forecast, &ThresholdConfig::default());

        assert_eq!(kinds(&anomalies), vec![AnomalyKind::HeavyPrecipitation]);
        assert_eq!(anomalies[0].severity, Severity::High);
        assert!(anomalies[0].description.contains("60.3 mm"));
    }

    #[test]
    fn test_scenario_f_uv_strictly_above_eight() {
        let config = ThresholdConfig::default();

        let high = evaluate(&[day("d1", 15.0, 0.0, 0.0).with_uv(9.0)], &config);
        assert_eq!(kinds(&high), vec![AnomalyKind::ExtremeUv]);
        assert_eq!(high[0].severity, Severity::Medium);
        assert_eq!(high[0].description, "UV Index: 9.0");

        let at_limit = evaluate(&[day("d1", 15.0, 0.0, 0.0).with_uv(8.0)], &config);
        assert!(at_limit.is_empty());
    }

    #[test]
    fn test_uv_reported_without_rounding() {
        let anomalies = evaluate(
            &[day("d1", 15.0, 0.0, 0.0).with_uv(10.35)],
            &ThresholdConfig::default(),
        );
        assert_eq!(anomalies[0].description, "UV Index: 10.35");
    }

    #[test]
    fn test_whole_uv_keeps_decimal_point() {
        let anomalies = evaluate(
            &[day("d1", 15.0, 0.0, 0.0).with_uv(11.0)],
            &ThresholdConfig::default(),
        );
        assert_eq!(anomalies[0].description, "UV Index: 11.0");
    }

    #[test]
    fn test_missing_uv_never_fires() {
        let forecast = vec![day("d1", 15.0, 0.0, 0.0), day("d2", 15.0, 0.0, 0.0)];
        let anomalies = evaluate(&forecast, &ThresholdConfig::default());
        assert!(!kinds(&anomalies).contains(&AnomalyKind::ExtremeUv));
    }

    #[test]
    fn test_empty_forecast() {
        let forecast: Vec<ForecastDay> = Vec::new();
        assert!(evaluate(&forecast, &ThresholdConfig::default()).is_empty());
    }

    #[test]
    fn test_single_day_never_temperature_anomaly() {
        for threshold in [0.0, 0.5, 5.0] {
            let config = ThresholdConfig {
                temp_anomaly_threshold_c: threshold,
                ..ThresholdConfig::default()
            };
            let anomalies = evaluate(&[day("d1", -12.7, 0.0, 0.0)], &config);
            assert!(anomalies.is_empty(), "threshold {} fired", threshold);
        }
    }

    #[test]
    fn test_identical_temperatures_never_fire() {
        let forecast: Vec<_> = ["d1", "d2", "d3", "d4", "d5", "d6", "d7"]
            .into_iter()
            .map(|d| day(d, 23.4, 0.0, 0.0))
            .collect();
        let config = ThresholdConfig {
            temp_anomaly_threshold_c: 0.0,
            ..ThresholdConfig::default()
        };
        assert!(evaluate(&forecast, &config).is_empty());
    }

    #[test]
    fn test_wind_equal_to_threshold_does_not_fire() {
        for threshold in [0.0, 35.5, 50.0, 120.0] {
            let config = ThresholdConfig {
                wind_speed_alert_kph: threshold,
                ..ThresholdConfig::default()
            };
            let anomalies = evaluate(&[day("d1", 15.0, threshold, 0.0)], &config);
            assert!(anomalies.is_empty(), "threshold {} fired", threshold);
        }
    }

    #[test]
    fn test_precipitation_equal_to_threshold_does_not_fire() {
        let anomalies = evaluate(&[day("d1", 15.0, 0.0, 50.0)], &ThresholdConfig::default());
        assert!(anomalies.is_empty());
    }

    #[test]
    fn test_all_checks_fire_in_fixed_order() {
        let forecast = vec![
            day("d1", 0.0, 10.0, 0.0),
            day("d2", 30.0, 80.0, 70.0).with_uv(11.0),
        ];
        let anomalies = evaluate(&forecast, &ThresholdConfig::default());

        assert_eq!(
            kinds(&anomalies),
            vec![
                AnomalyKind::TemperatureAnomaly,
                AnomalyKind::TemperatureAnomaly,
                AnomalyKind::HighWind,
                AnomalyKind::HeavyPrecipitation,
                AnomalyKind::ExtremeUv,
            ]
        );
        assert_eq!(anomalies[0].date, "d1");
        assert!(anomalies[1..].iter().all(|a| a.date == "d2"));
    }

    #[test]
    fn test_order_follows_forecast_positions() {
        let forecast = vec![
            day("d1", 15.0, 60.0, 0.0),
            day("d2", 15.0, 0.0, 0.0),
            day("d3", 15.0, 0.0, 55.0).with_uv(9.5),
            day("d4", 15.0, 51.0, 0.0),
        ];
        let position = |date: &str| forecast.iter().position(|d| d.date == date).unwrap();

        let anomalies = evaluate(&forecast, &ThresholdConfig::default());
        let positions: Vec<usize> = anomalies.iter().map(|a| position(a.date)).collect();

        assert_eq!(positions, vec![0, 2, 2, 3]);
        assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_idempotent() {
        let forecast = vec![
            day("d1", 8.0, 62.0, 0.0),
            day("d2", 21.0, 10.0, 51.0).with_uv(9.0),
            day("d3", 14.0, 20.0, 3.0),
        ];
        let config = ThresholdConfig::default();
        assert_eq!(evaluate(&forecast, &config), evaluate(&forecast, &config));
    }

    #[test]
    fn test_input_not_mutated() {
        let forecast = vec![day("d1", 8.0, 62.0, 0.0), day("d2", 21.0, 10.0, 51.0)];
        let before = forecast.clone();
        let _ = evaluate(&forecast, &ThresholdConfig::default());
        assert_eq!(forecast, before);
    }

    #[test]
    fn test_malformed_day_skipped_others_evaluated() {
        let forecast = vec![
            day("d1", 10.0, 60.0, 0.0),
            day("d2", f64::NAN, 90.0, 90.0),
            day("d3", 20.0, 0.0, 0.0),
        ];
        let config = ThresholdConfig {
            temp_anomaly_threshold_c: 4.9,
            ..ThresholdConfig::default()
        };
        let anomalies = evaluate(&forecast, &config);

        // Average is over d1 and d3 only
        assert_eq!(
            kinds(&anomalies),
            vec![
                AnomalyKind::TemperatureAnomaly,
                AnomalyKind::HighWind,
                AnomalyKind::TemperatureAnomaly,
            ]
        );
        assert!(anomalies.iter().all(|a| a.date != "d2"));
        assert!(anomalies[0].description.contains("avg: 15.0C"));
    }

    #[test]
    fn test_all_days_malformed_yields_empty() {
        let forecast = vec![day("d1", f64::NAN, 90.0, 0.0), day("d2", 15.0, f64::INFINITY, 0.0)];
        assert!(evaluate(&forecast, &ThresholdConfig::default()).is_empty());
    }

    #[test]
    fn test_naive_date_records() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 14).unwrap();
        let forecast = vec![ForecastDay::new(date, 25.0, 65.0, 0.0)];
        let anomalies = evaluate(&forecast, &ThresholdConfig::default());
        assert_eq!(anomalies[0].date, date);
    }

    #[test]
    fn test_record_serialization_tags() {
        let record = AnomalyRecord {
            kind: AnomalyKind::ExtremeUv,
            date: NaiveDate::from_ymd_opt(2024, 7, 14).unwrap(),
            severity: Severity::Medium,
            description: "UV Index: 9.0".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "ExtremeUV");
        assert_eq!(json["severity"], "medium");
        assert_eq!(json["date"], "2024-07-14");

        let wind = serde_json::to_value(AnomalyKind::HighWind).unwrap();
        assert_eq!(wind, "HighWind");
    }

    #[test]
    fn test_rounding_ties_away_from_zero() {
        assert_eq!(round_half_away(60.25, 1), 60.3);
        assert_eq!(round_half_away(-2.25, 1), -2.3);
        assert_eq!(round_half_away(75.5, 0), 76.0);
        assert_eq!(round_half_away(75.4, 0), 75.0);
    }

    #[test]
    fn test_kind_labels_and_severities() {
        assert_eq!(AnomalyKind::HighWind.label(), "High Wind Speed");
        assert_eq!(AnomalyKind::ExtremeUv.label(), "Extreme UV Index");
        assert_eq!(AnomalyKind::HeavyPrecipitation.severity(), Severity::High);
        assert_eq!(AnomalyKind::TemperatureAnomaly.severity(), Severity::Medium);
        assert!(Severity::High > Severity::Medium && Severity::Medium > Severity::Low);
        assert_eq!(Severity::Low.to_string(), "low");
    }
}
