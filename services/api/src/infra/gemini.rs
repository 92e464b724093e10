use async_trait::async_trait;
use body_climate::config::NarrativeConfig;
use body_climate::survey::{NarrativeError, NarrativeGenerator};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Narrative provider calling the Gemini `generateContent` endpoint.
pub(crate) struct GeminiNarrative {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiNarrative {
    /// Returns `None` when no API key is configured.
    pub(crate) fn from_config(config: &NarrativeConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

/// Concatenated text of the first candidate.
fn extract_text(body: &Value) -> Result<String, NarrativeError> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or(NarrativeError::EmptyResponse)?;
    let text: String = parts
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();
    if text.trim().is_empty() {
        return Err(NarrativeError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl NarrativeGenerator for GeminiNarrative {
    async fn generate(&self, prompt: &str) -> Result<String, NarrativeError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        debug!(model = %self.model, "calling gemini");
        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|error| NarrativeError::Remote(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NarrativeError::Remote(format!("HTTP {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|error| NarrativeError::Remote(error.to_string()))?;
        extract_text(&payload)
    }
}
