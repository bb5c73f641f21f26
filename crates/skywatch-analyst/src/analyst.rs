//! High-level narrative operations over the Gemini client.

use skywatch_weather::{AnomalyRecord, CurrentResponse, ForecastResponse};

use crate::client::GeminiClient;
use crate::error::AnalystError;
use crate::prompt;

/// Produces the narrative sections of the report.
///
/// Without an API key every operation returns [`AnalystError::NotConfigured`]
/// so callers can show a setup notice in place of the text.
pub struct WeatherAnalyst {
    client: Option<GeminiClient>,
}

impl WeatherAnalyst {
    pub fn from_client(client: GeminiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&GeminiClient, AnalystError> {
        self.client.as_ref().ok_or(AnalystError::NotConfigured)
    }

    pub async fn analyze_current(&self, weather: &CurrentResponse) -> Result<String, AnalystError> {
        let client = self.client()?;
        client
            .generate(&prompt::current_conditions_prompt(weather))
            .await
    }

    pub async fn analyze_forecast(
        &self,
        forecast: &ForecastResponse,
    ) -> Result<String, AnalystError> {
        let client = self.client()?;
        client.generate(&prompt::forecast_prompt(forecast)).await
    }

    pub async fn weather_insights(
        &self,
        weather: &CurrentResponse,
        anomalies: &[AnomalyRecord],
    ) -> Result<String, AnalystError> {
        let client = self.client()?;
        client
            .generate(&prompt::insights_prompt(weather, anomalies))
            .await
    }

    pub async fn activity_recommendations(
        &self,
        weather: &CurrentResponse,
    ) -> Result<String, AnalystError> {
        let client = self.client()?;
        client.generate(&prompt::activity_prompt(weather)).await
    }
}
