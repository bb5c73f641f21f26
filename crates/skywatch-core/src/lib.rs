pub mod config;
pub mod error;

pub use config::{
    AlertConfig, AnalystConfig, Config, ConfigValidationError, ServiceStatus, ValidationResult,
    WeatherConfig,
};
pub use error::{AnalystError, AppError, ConfigError, NetworkError, WeatherError};

use anyhow::Result;

/// Initialize logging and load `.env` overrides.
///
/// `default_filter` applies when `RUST_LOG` is unset.
pub fn init(default_filter: &str) -> Result<()> {
    // Loaded first so RUST_LOG may come from .env; a missing file is the normal case
    let env_file = dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    tracing::info!("Skywatch core initialized");
    Ok(())
}
