use crate::config::{DEFAULT_API_URL, LlmConfig};
use crate::llm::models::{OllamaOptions, OllamaRequest, OllamaResponse, SYSTEM_ROLE};
use crate::llm::{GatewayError, ModelGateway};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";

/// Picks the generate endpoint from the shared `llm.api_url` setting.
///
/// A bare host gets `/api/generate` appended. The hosted default and any
/// other non-Ollama path fall back to the local server.
fn ollama_url(configured: Option<&str>) -> String {
    let Some(url) = configured else {
        return DEFAULT_OLLAMA_URL.to_string();
    };
    if url.contains("/api/generate") {
        return url.to_string();
    }
    if url == DEFAULT_API_URL {
        return DEFAULT_OLLAMA_URL.to_string();
    }

    match reqwest::Url::parse(url) {
        Ok(parsed) if parsed.path() == "/" => {
            format!("{}/api/generate", url.trim_end_matches('/'))
        }
        _ => {
            warn!(
                "Ignoring api_url {} for the Ollama backend, using {}",
                url, DEFAULT_OLLAMA_URL
            );
            DEFAULT_OLLAMA_URL.to_string()
        }
    }
}

pub struct OllamaProvider {
    client: reqwest::Client,
    api_url: String,
    model: String,
    temperature: f32,
}

impl OllamaProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, GatewayError> {
        let api_url = ollama_url(config.api_url.as_deref());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        info!("Using Ollama endpoint {} with model {}", api_url, config.model);

        Ok(Self {
            client,
            api_url,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ModelGateway for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let request = OllamaRequest {
            model: self.model.clone(),
            system: SYSTEM_ROLE.to_string(),
            prompt: prompt.to_string(),
            stream: false, // Explicitly disable streaming
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        debug!("Sending request to Ollama with model: {}", self.model);

        let response = self.client.post(&self.api_url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Ollama API responded with status code: {}", status);
            return Err(GatewayError::ResponseError(format!(
                "Ollama API responded with status code: {}",
                status
            )));
        }

        let response_text = response.text().await?;

        let ollama_response = serde_json::from_str::<OllamaResponse>(&response_text).map_err(|e| {
            error!("Failed to parse Ollama response: {}", e);
            GatewayError::ResponseError(format!("Failed to parse Ollama response: {}", e))
        })?;

        if ollama_response.response.trim().is_empty() {
            return Err(GatewayError::ResponseError("Empty completion".to_string()));
        }

        Ok(ollama_response.response)
    }
}
