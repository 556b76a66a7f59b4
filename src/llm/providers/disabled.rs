use crate::llm::{GatewayError, ModelGateway};
use async_trait::async_trait;

/// Offline backend: answers every prompt with [`GatewayError::Disabled`] so
/// the pipeline runs on fallback values without touching the network.
pub struct DisabledProvider;

#[async_trait]
impl ModelGateway for DisabledProvider {
    async fn complete(&self, _prompt: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Disabled)
    }
}
