mod error_mapping;
mod report;

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use skywatch_analyst::{GeminiClient, GenerationSettings, WeatherAnalyst};
use skywatch_core::{AppError, Config, ConfigError};
use skywatch_weather::{
    evaluate, CurrentResponse, ForecastCache, ForecastResponse, ThresholdConfig, WeatherApiClient,
    WeatherError,
};

use report::{Dashboard, Narratives};

#[derive(Parser, Debug)]
#[command(
    name = "skywatch",
    version,
    about = "Weather dashboard with forecast anomaly alerts and AI analysis"
)]
struct Cli {
    /// City, postcode or "lat,lon" (defaults to the configured location)
    location: Option<String>,

    /// Forecast horizon in days
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=14))]
    days: Option<u8>,

    /// Ignore cached responses and fetch fresh data
    #[arg(long)]
    refresh: bool,

    /// Skip the Gemini narratives
    #[arg(long)]
    no_ai: bool,

    /// Print detected anomalies as JSON and exit
    #[arg(long)]
    json: bool,

    /// List locations matching a query and exit
    #[arg(long, value_name = "QUERY", conflicts_with = "location")]
    search: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    skywatch_core::init("warn")?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            let err = AppError::from(ConfigError::Load(format!("{:#}", e)));
            tracing::error!("{}", err);
            eprintln!("{}", err.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };
    let validation = config.validate();

    if !cli.json {
        println!("{}", report::render_status(&config.service_status()));
    }

    if !validation.is_valid() {
        tracing::error!("{}", AppError::from(ConfigError::Invalid(validation.error_summary())));
        eprintln!("{}", report::render_setup_help(&validation));
        return Ok(ExitCode::FAILURE);
    }
    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    let client = match WeatherApiClient::with_base_url(
        &config.weather.api_key,
        &config.weather.base_url,
        Duration::from_secs(config.weather.request_timeout_secs),
    ) {
        Ok(client) => client,
        Err(e) => return Ok(fail("Unable to start the weather client", e)),
    };

    if let Some(query) = &cli.search {
        return match client.search_locations(query).await {
            Ok(matches) => {
                println!("{}", report::render_search_results(query, &matches));
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => Ok(fail(&format!("Location search for '{}' failed", query), e)),
        };
    }

    let location = cli
        .location
        .clone()
        .unwrap_or_else(|| config.weather.default_location.clone());
    let days = cli.days.unwrap_or(config.weather.forecast_days);

    let mut cache = ForecastCache::open(
        &config.config_dir,
        Duration::from_secs(config.weather.cache_ttl_secs),
    );

    let (current, forecast) =
        match fetch_weather(&client, &mut cache, &location, days, cli.refresh).await {
            Ok(data) => data,
            Err(e) => {
                return Ok(fail(
                    &format!("Unable to fetch weather data for '{}'", location),
                    e,
                ))
            }
        };

    let anomalies = evaluate(&forecast.evaluation_days(), &thresholds(&config));
    tracing::info!("{} anomalies detected for {}", anomalies.len(), location);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&anomalies)?);
        return Ok(ExitCode::SUCCESS);
    }

    let (narratives, insights) = if cli.no_ai {
        (None, None)
    } else {
        let analyst = build_analyst(&config);
        let (current_text, forecast_text, activities, insights) = tokio::join!(
            analyst.analyze_current(&current),
            analyst.analyze_forecast(&forecast),
            analyst.activity_recommendations(&current),
            async {
                if anomalies.is_empty() {
                    None
                } else {
                    Some(analyst.weather_insights(&current, &anomalies).await)
                }
            },
        );

        let narratives = Narratives {
            current: current_text.map_err(error_mapping::analyst_error),
            forecast: forecast_text.map_err(error_mapping::analyst_error),
            activities: activities.map_err(error_mapping::analyst_error),
        };
        (
            Some(narratives),
            insights.map(|r| r.map_err(error_mapping::analyst_error)),
        )
    };

    let days = forecast.detailed_days();
    let dashboard = Dashboard {
        location: &current.location,
        current: &current.current,
        days: &days,
        anomalies: &anomalies,
        narratives,
        insights,
    };
    println!("{}", dashboard.render());

    Ok(ExitCode::SUCCESS)
}

/// Report a fatal weather error and pick the exit code.
fn fail(context: &str, e: WeatherError) -> ExitCode {
    let err = error_mapping::weather_error(e);
    tracing::error!("{}: {}", context, err);
    eprintln!("{}: {}", context, err.user_message());
    ExitCode::FAILURE
}

fn thresholds(config: &Config) -> ThresholdConfig {
    ThresholdConfig {
        temp_anomaly_threshold_c: config.alerts.temp_anomaly_threshold_c,
        wind_speed_alert_kph: config.alerts.wind_speed_alert_kph,
        precipitation_alert_mm: config.alerts.precipitation_alert_mm,
    }
}

fn build_analyst(config: &Config) -> WeatherAnalyst {
    if !config.analyst.is_configured() {
        return WeatherAnalyst::disabled();
    }

    let settings = GenerationSettings {
        model: config.analyst.model.clone(),
        temperature: config.analyst.temperature,
        max_output_tokens: config.analyst.max_output_tokens,
    };
    WeatherAnalyst::from_client(GeminiClient::with_base_url(
        &config.analyst.api_key,
        &config.analyst.base_url,
        settings,
    ))
}

/// Current conditions and forecast, from the cache when both are fresh.
async fn fetch_weather(
    client: &WeatherApiClient,
    cache: &mut ForecastCache,
    location: &str,
    days: u8,
    refresh: bool,
) -> Result<(CurrentResponse, ForecastResponse), WeatherError> {
    let current_key = ForecastCache::current_key(location);
    let forecast_key = ForecastCache::forecast_key(location, days);

    if !refresh {
        let cached = cache
            .get::<CurrentResponse>(&current_key)
            .zip(cache.get::<ForecastResponse>(&forecast_key));
        if let Some(hit) = cached {
            return Ok(hit);
        }
    }

    let (current, forecast) =
        tokio::try_join!(client.current(location), client.forecast(location, days))?;

    if let Err(e) = cache
        .put(&current_key, &current)
        .and_then(|_| cache.put(&forecast_key, &forecast))
    {
        tracing::warn!("Failed to update weather cache: {}", e);
    }

    Ok((current, forecast))
}
