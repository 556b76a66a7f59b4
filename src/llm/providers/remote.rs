use crate::config::LlmConfig;
use crate::llm::models::{ChatMessage, ChatRequest, ChatResponse, SYSTEM_ROLE};
use crate::llm::{GatewayError, ModelGateway};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

pub struct RemoteLlmProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl RemoteLlmProvider {
    pub fn new(config: &LlmConfig) -> Result<Self, GatewayError> {
        let api_url = config.api_url.clone().ok_or_else(|| {
            GatewayError::ConfigError("API URL is required for remote LLM provider".to_string())
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl ModelGateway for RemoteLlmProvider {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GatewayError::ConfigError("API key is required for remote LLM provider".to_string())
        })?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_ROLE), ChatMessage::user(prompt)],
            temperature: self.temperature,
        };

        debug!("Sending chat completion request with model: {}", self.model);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Chat completion API responded with status code: {}", status);
            return Err(GatewayError::ResponseError(format!(
                "API responded with status code: {}",
                status
            )));
        }

        let response_text = response.text().await?;

        let chat_response: ChatResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse chat completion response: {}", e);
            GatewayError::ResponseError(format!("Malformed response body: {}", e))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::ResponseError("No choices in response".to_string()))?;

        if content.trim().is_empty() {
            return Err(GatewayError::ResponseError("Empty completion".to_string()));
        }

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use mockito::Matcher;
    use serde_json::json;

    fn provider_for(server: &mockito::ServerGuard, api_key: Option<&str>) -> RemoteLlmProvider {
        let mut config = AppConfig::default().llm;
        config.api_url = Some(format!("{}/chat/completions", server.url()));
        config.api_key = api_key.map(str::to_string);
        config.timeout_secs = 5;
        RemoteLlmProvider::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "glm-4-flash",
                "messages": [
                    {"role": "system", "content": SYSTEM_ROLE},
                    {"role": "user", "content": "how many users?"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"choices": [{"message": {"role": "assistant", "content": "SELECT COUNT(*) FROM users;"}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let provider = provider_for(&server, Some("test-key"));
        let content = provider.complete("how many users?").await.unwrap();

        assert_eq!(content, "SELECT COUNT(*) FROM users;");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let provider = provider_for(&server, Some("test-key"));
        match provider.complete("hi").await {
            Err(GatewayError::ResponseError(msg)) => assert!(msg.contains("429")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("{\"not\": \"a completion\"}")
            .create_async()
            .await;

        let provider = provider_for(&server, Some("test-key"));
        assert!(matches!(
            provider.complete("hi").await,
            Err(GatewayError::ResponseError(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": []}).to_string())
            .create_async()
            .await;

        let provider = provider_for(&server, Some("test-key"));
        assert!(matches!(
            provider.complete("hi").await,
            Err(GatewayError::ResponseError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_calling_out() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let provider = provider_for(&server, None);
        assert!(matches!(
            provider.complete("hi").await,
            Err(GatewayError::ConfigError(_))
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_messages_do_not_leak_key() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .create_async()
            .await;

        let provider = provider_for(&server, Some("sk-secret-value"));
        let err = provider.complete("hi").await.unwrap_err();
        assert!(!err.to_string().contains("sk-secret-value"));
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold connections without ever answering.
        let stall = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut config = AppConfig::default().llm;
        config.api_url = Some(format!("http://{}/chat/completions", addr));
        config.api_key = Some("test-key".to_string());
        config.timeout_secs = 1;
        let provider = RemoteLlmProvider::new(&config).unwrap();

        let started = std::time::Instant::now();
        let result = tokio::time::timeout(Duration::from_secs(10), provider.complete("hi"))
            .await
            .expect("client timeout did not fire");

        assert!(matches!(result, Err(GatewayError::Timeout(_))), "{:?}", result);
        assert!(started.elapsed() < Duration::from_secs(5));
        stall.abort();
    }
}

