use std::sync::Arc;

use async_trait::async_trait;

use super::OpenAiCompatibleEmbeddingProvider;
use crate::domain::embedding::{EmbeddingModelConfig, EmbeddingProvider};
use crate::domain::DomainError;
use crate::infrastructure::http_client::{HttpClient, HttpClientTrait};
use crate::infrastructure::lazy_cache::ResourceFactory;

const PROBE_TEXT: &str = "ping";

/// Builds embedding model clients from their configuration
#[derive(Debug)]
pub struct EmbeddingProviderFactory {
    client: Arc<dyn HttpClientTrait>,
    probe: bool,
}

impl Default for EmbeddingProviderFactory {
    fn default() -> Self {
        Self::new(Arc::new(HttpClient::new()))
    }
}

impl EmbeddingProviderFactory {
    pub fn new(client: Arc<dyn HttpClientTrait>) -> Self {
        Self {
            client,
            probe: false,
        }
    }

    /// Send one embedding call while building, so bad credentials or a
    /// wrong model name fail construction instead of the first real request.
    /// Also learns the output dimensions when they are not configured.
    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Build a provider without probing it
    pub fn build(
        &self,
        config: &EmbeddingModelConfig,
    ) -> Result<OpenAiCompatibleEmbeddingProvider, DomainError> {
        config.validate()?;
        let api_key = config.resolve_api_key()?;

        Ok(OpenAiCompatibleEmbeddingProvider::new(
            self.client.clone(),
            config.kind,
            api_key,
            config.effective_base_url(),
            config.name.clone(),
        )
        .with_dimensions(config.dimensions))
    }
}

#[async_trait]
impl ResourceFactory<EmbeddingModelConfig, dyn EmbeddingProvider> for EmbeddingProviderFactory {
    async fn create(
        &self,
        config: &EmbeddingModelConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let mut provider = self.build(config)?;

        if self.probe {
            let vector = provider.embed_query(PROBE_TEXT).await?;

            if provider.dimensions().is_none() {
                provider = provider.with_dimensions(Some(vector.len()));
            }
        }

        tracing::info!(
            kind = %config.kind,
            model = %config.name,
            base_url = %config.effective_base_url(),
            dimensions = ?provider.dimensions(),
            "Created embedding provider"
        );

        Ok(Arc::new(provider))
    }
}
