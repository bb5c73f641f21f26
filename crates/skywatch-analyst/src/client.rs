//! Gemini `generateContent` client.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AnalystError;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Model and sampling settings sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-exp".to_string(),
            temperature: 0.2,
            max_output_tokens: 1000,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, AnalystError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AnalystError::Blocked(reason));
        }

        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(AnalystError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    settings: GenerationSettings,
}

impl GeminiClient {
    /// Client against `base_url` (the public API, a regional proxy, or a test server).
    pub fn with_base_url(api_key: &str, base_url: &str, settings: GenerationSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        }
    }

    /// Send a single-turn prompt and return the model's text.
    #[instrument(skip(self, prompt), fields(model = %self.settings.model, prompt_len = prompt.len()), level = "info")]
    pub async fn generate(&self, prompt: &str) -> Result<String, AnalystError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.settings.model,
        );

        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalystError::NetworkError(e.without_url()))?;
        let parsed: GenerateResponse = self.handle_response(response).await?;
        parsed.into_text()
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AnalystError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| AnalystError::ApiError(format!("JSON parse error: {}", e.without_url())));
        }

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(AnalystError::RateLimited(retry_after));
        }

        let text = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<ApiErrorBody>(&text)
            .ok()
            .map(|body| body.error);

        match (status.as_u16(), detail) {
            (401 | 403, _) => Err(AnalystError::InvalidApiKey),
            // Gemini reports a bad key as 400 INVALID_ARGUMENT
            (400, Some(d)) if d.message.contains("API key") => Err(AnalystError::InvalidApiKey),
            (_, Some(d)) => Err(AnalystError::ApiError(format!(
                "{} {}: {}",
                status, d.status, d.message
            ))),
            (_, None) => Err(AnalystError::ApiError(format!("{}: {}", status, text))),
        }
    }
}
