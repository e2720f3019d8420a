//! Embedding model cache
//!
//! Lazily builds embedding model clients on first use and shares each one
//! across every concurrent caller:
//! - Generic keyed lazy-initialization cache with per-key locking
//! - OpenAI-compatible clients for OpenAI and Qwen (DashScope)
//! - Layered configuration with named models and a default model

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use infrastructure::embedding::{EmbeddingModelCache, EmbeddingProviderFactory};
use infrastructure::http_client::HttpClient;

/// Build the process-wide embedding model cache from configuration
pub fn create_model_cache(config: &AppConfig) -> anyhow::Result<EmbeddingModelCache> {
    let settings = &config.embedding;
    settings.validate()?;

    let http_client = HttpClient::with_timeout(settings.http_timeout())?;
    let factory = EmbeddingProviderFactory::new(Arc::new(http_client))
        .with_probe(settings.probe_on_create);

    tracing::info!(
        default_key = %settings.default_key,
        default_model = %settings.default_model.name,
        configured_models = settings.models.len(),
        "Creating embedding model cache"
    );

    Ok(EmbeddingModelCache::with_factory(
        Arc::new(factory),
        settings.cache_config(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::lazy_cache::KeyState;

    #[tokio::test]
    async fn test_create_model_cache_from_defaults() {
        let cache = create_model_cache(&AppConfig::default()).unwrap();

        assert_eq!(cache.default_key(), "default");
        assert_eq!(cache.configured_keys(), vec!["default"]);
        assert_eq!(cache.state("default").await, KeyState::Unbound);
        assert!(cache.loaded_keys().await.is_empty());
    }

    #[test]
    fn test_create_model_cache_rejects_zero_http_timeout() {
        let mut config = AppConfig::default();
        config.embedding.http_timeout_secs = 0;

        let err = create_model_cache(&config).unwrap_err();

        assert!(err.to_string().contains("http_timeout_secs"));
    }
}
