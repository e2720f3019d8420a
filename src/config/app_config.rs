use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::embedding::{EmbeddingModelConfig, DEFAULT_MODEL_KEY};
use crate::domain::DomainError;
use crate::infrastructure::embedding::EmbeddingModelCacheConfig;
use crate::infrastructure::lazy_cache::LazyCacheConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub embedding: EmbeddingSettings,
}

/// Prometheus metrics; rendered to stderr after each command when enabled
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Embedding model cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub default_key: String,
    pub default_model: EmbeddingModelConfig,
    pub models: HashMap<String, EmbeddingModelConfig>,
    /// Bound on waiting for another caller's model construction
    pub lock_timeout_secs: Option<u64>,
    /// Issue a test embedding while building each model
    pub probe_on_create: bool,
    pub http_timeout_secs: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            default_key: DEFAULT_MODEL_KEY.to_string(),
            default_model: EmbeddingModelConfig::default(),
            models: HashMap::new(),
            lock_timeout_secs: None,
            probe_on_create: false,
            http_timeout_secs: 30,
        }
    }
}

impl EmbeddingSettings {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.http_timeout_secs == 0 {
            return Err(DomainError::configuration(
                "embedding.http_timeout_secs must be greater than zero",
            ));
        }

        if self.lock_timeout_secs == Some(0) {
            return Err(DomainError::configuration(
                "embedding.lock_timeout_secs must be greater than zero",
            ));
        }

        if self.models.contains_key(&self.default_key) {
            return Err(DomainError::configuration(format!(
                "embedding.models.{} clashes with the default key; configure it as embedding.default_model",
                self.default_key
            )));
        }

        Ok(())
    }

    /// Settings for the embedding model cache
    pub fn cache_config(&self) -> EmbeddingModelCacheConfig {
        let mut lazy = LazyCacheConfig::new("embedding_model");
        if let Some(secs) = self.lock_timeout_secs {
            lazy = lazy.with_lock_timeout(Duration::from_secs(secs));
        }

        let config = EmbeddingModelCacheConfig::default()
            .with_default(self.default_key.clone(), self.default_model.clone())
            .with_lazy_config(lazy);

        self.models
            .iter()
            .fold(config, |config, (key, model)| config.with_model(key.clone(), model.clone()))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
