//! Process-wide cache of embedding model clients

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;

use super::EmbeddingProviderFactory;
use crate::domain::embedding::{EmbeddingModelConfig, EmbeddingProvider, DEFAULT_MODEL_KEY};
use crate::domain::DomainError;
use crate::infrastructure::lazy_cache::{KeyState, LazyCacheConfig, LazyKeyedCache, ResourceFactory};

/// Defaults and named models the cache resolves keys against
#[derive(Debug, Clone)]
pub struct EmbeddingModelCacheConfig {
    pub default_key: String,
    pub default_model: EmbeddingModelConfig,
    /// Named model configurations, looked up by key
    pub models: HashMap<String, EmbeddingModelConfig>,
    pub lazy: LazyCacheConfig,
}

impl Default for EmbeddingModelCacheConfig {
    fn default() -> Self {
        Self {
            default_key: DEFAULT_MODEL_KEY.to_string(),
            default_model: EmbeddingModelConfig::default(),
            models: HashMap::new(),
            lazy: LazyCacheConfig::new("embedding_model"),
        }
    }
}

impl EmbeddingModelCacheConfig {
    pub fn with_default(mut self, key: impl Into<String>, model: EmbeddingModelConfig) -> Self {
        self.default_key = key.into();
        self.default_model = model;
        self
    }

    pub fn with_model(mut self, key: impl Into<String>, model: EmbeddingModelConfig) -> Self {
        self.models.insert(key.into(), model);
        self
    }

    pub fn with_lazy_config(mut self, lazy: LazyCacheConfig) -> Self {
        self.lazy = lazy;
        self
    }

    /// Configuration registered for `key`
    ///
    /// The default key always maps to the default model, even when `models`
    /// carries an entry under the same name.
    pub fn resolve(&self, key: &str) -> Option<&EmbeddingModelConfig> {
        if key == self.default_key {
            return Some(&self.default_model);
        }

        self.models.get(key)
    }
}

/// Shares one client per model key across all callers
///
/// The default key and default configuration are fixed when the cache is
/// built and never change afterwards.
pub struct EmbeddingModelCache {
    inner: LazyKeyedCache<String, EmbeddingModelConfig, dyn EmbeddingProvider>,
    config: EmbeddingModelCacheConfig,
}

impl std::fmt::Debug for EmbeddingModelCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingModelCache")
            .field("default_key", &self.config.default_key)
            .field("models", &self.config.models.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EmbeddingModelCache {
    /// Cache backed by the HTTP provider factory
    pub fn new(config: EmbeddingModelCacheConfig) -> Self {
        Self::with_factory(Arc::new(EmbeddingProviderFactory::default()), config)
    }

    pub fn with_factory(
        factory: Arc<dyn ResourceFactory<EmbeddingModelConfig, dyn EmbeddingProvider>>,
        config: EmbeddingModelCacheConfig,
    ) -> Self {
        Self {
            inner: LazyKeyedCache::with_config(factory, config.lazy.clone()),
            config,
        }
    }

    pub fn default_key(&self) -> &str {
        &self.config.default_key
    }

    /// Client for `key`, built from `config` if the key is not bound yet
    pub async fn get_model(
        &self,
        key: &str,
        config: &EmbeddingModelConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        self.inner.get(&key.to_string(), config).await
    }

    /// Client for the default key and default configuration
    pub async fn get_default(&self) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        self.inner
            .get(&self.config.default_key, &self.config.default_model)
            .await
    }

    /// Client for a configured model key
    pub async fn get_named(&self, key: &str) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let key = key.to_string();

        if let Some(provider) = self.inner.lookup(&key).await {
            return Ok(provider);
        }

        let config = self.config.resolve(&key).ok_or_else(|| {
            DomainError::not_found(format!("No embedding model configured for key '{}'", key))
        })?;

        self.inner.get(&key, config).await
    }

    /// Build several configured models concurrently, reporting each outcome
    pub async fn warm_up(&self, keys: &[String]) -> Vec<(String, Result<(), DomainError>)> {
        let results = join_all(keys.iter().map(|key| async move {
            let result = self.get_named(key).await.map(|_| ());
            (key.clone(), result)
        }))
        .await;

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        tracing::info!(
            requested = keys.len(),
            failed = failed,
            "Embedding model warm-up finished"
        );

        results
    }

    /// Every key the cache can resolve without an explicit configuration
    pub fn configured_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.config.models.keys().cloned().collect();

        if !keys.contains(&self.config.default_key) {
            keys.push(self.config.default_key.clone());
        }

        keys.sort();
        keys
    }

    pub async fn state(&self, key: &str) -> KeyState {
        self.inner.state(&key.to_string()).await
    }

    pub async fn loaded_keys(&self) -> Vec<String> {
        let mut keys = self.inner.keys().await;
        keys.sort();
        keys
    }
}
