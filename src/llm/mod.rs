pub mod models;
pub mod providers;

use crate::config::LlmConfig;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum GatewayError {
    ConnectionError(String),
    Timeout(String),
    ResponseError(String),
    ConfigError(String),
    Disabled,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::ConnectionError(msg) => write!(f, "LLM connection error: {}", msg),
            GatewayError::Timeout(msg) => write!(f, "LLM request timed out: {}", msg),
            GatewayError::ResponseError(msg) => write!(f, "LLM response error: {}", msg),
            GatewayError::ConfigError(msg) => write!(f, "LLM configuration error: {}", msg),
            GatewayError::Disabled => write!(f, "LLM backend is disabled"),
        }
    }
}

impl Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors carry the URL but never request headers.
        if err.is_timeout() {
            GatewayError::Timeout(err.to_string())
        } else if err.is_decode() {
            GatewayError::ResponseError(err.to_string())
        } else {
            GatewayError::ConnectionError(err.to_string())
        }
    }
}

/// One prompt in, one completion out.
///
/// Implementations make exactly one outbound call per invocation and do not
/// retry; callers decide what a failure means.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError>;
}

pub struct LlmManager {
    gateway: Box<dyn ModelGateway>,
}

impl LlmManager {
    pub fn new(config: &LlmConfig) -> Result<Self, GatewayError> {
        let gateway: Box<dyn ModelGateway> = match config.backend.as_str() {
            "remote" => {
                if config.api_key.is_none() {
                    warn!("No API key configured; every model call will use fallback values");
                }
                Box::new(providers::remote::RemoteLlmProvider::new(config)?)
            }
            "ollama" => Box::new(providers::ollama::OllamaProvider::new(config)?),
            "disabled" => Box::new(providers::disabled::DisabledProvider),
            _ => {
                return Err(GatewayError::ConfigError(format!(
                    "Unsupported LLM backend: {}",
                    config.backend
                )))
            }
        };

        Ok(Self { gateway })
    }
}

#[async_trait]
impl ModelGateway for LlmManager {
    async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
        self.gateway.complete(prompt).await
    }
}

#[cfg(test)]
pub mod testing {
    use super::{GatewayError, ModelGateway};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays canned replies in order; fails once the script runs out.
    pub struct ScriptedGateway {
        replies: Mutex<VecDeque<Result<String, GatewayError>>>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        pub fn new(replies: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn replying(replies: &[&str]) -> Self {
            Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
        }

        pub fn failing() -> Self {
            Self::new(Vec::new())
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelGateway for ScriptedGateway {
        async fn complete(&self, prompt: &str) -> Result<String, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::ConnectionError("script exhausted".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_unknown_backend_is_rejected() {
        let mut config = AppConfig::default().llm;
        config.backend = "local".to_string();

        match LlmManager::new(&config) {
            Err(GatewayError::ConfigError(msg)) => assert!(msg.contains("local")),
            _ => panic!("expected a configuration error"),
        }
    }

    #[tokio::test]
    async fn test_disabled_backend_never_answers() {
        let mut config = AppConfig::default().llm;
        config.backend = "disabled".to_string();

        let manager = LlmManager::new(&config).unwrap();
        assert!(matches!(
            manager.complete("anything").await,
            Err(GatewayError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_remote_backend_without_key_still_builds() {
        let mut config = AppConfig::default().llm;
        config.api_key = None;

        let manager = LlmManager::new(&config).unwrap();
        assert!(matches!(
            manager.complete("anything").await,
            Err(GatewayError::ConfigError(_))
        ));
    }
}
