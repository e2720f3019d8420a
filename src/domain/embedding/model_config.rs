//! Embedding model configuration

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Key under which the default embedding model is cached
pub const DEFAULT_MODEL_KEY: &str = "default";

const DEFAULT_QWEN_MODEL: &str = "text-embedding-v4";

/// Backend serving an embedding model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingModelKind {
    /// Alibaba DashScope (Qwen) through its OpenAI-compatible endpoint
    #[default]
    Qwen,
    /// OpenAI or any OpenAI-compatible server
    #[serde(alias = "openai")]
    OpenAi,
}

impl EmbeddingModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingModelKind::Qwen => "qwen",
            EmbeddingModelKind::OpenAi => "openai",
        }
    }

    /// Environment variable consulted when no API key is configured
    pub fn api_key_env(&self) -> &'static str {
        match self {
            EmbeddingModelKind::Qwen => "DASHSCOPE_API_KEY",
            EmbeddingModelKind::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            EmbeddingModelKind::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
            EmbeddingModelKind::OpenAi => "https://api.openai.com/v1",
        }
    }
}

impl std::fmt::Display for EmbeddingModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EmbeddingModelKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qwen" | "dashscope" => Ok(EmbeddingModelKind::Qwen),
            "openai" | "open_ai" => Ok(EmbeddingModelKind::OpenAi),
            _ => Err(DomainError::configuration(format!(
                "Unknown embedding model kind: {}. Valid kinds: qwen, openai",
                s
            ))),
        }
    }
}

/// How to build an embedding model client
///
/// Immutable once handed to the cache; only read when the model's key has
/// not been constructed yet.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingModelConfig {
    #[serde(default)]
    pub kind: EmbeddingModelKind,
    /// Provider-side model name
    pub name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Overrides the kind's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    /// Requested output dimensions, for models that support it
    #[serde(default)]
    pub dimensions: Option<usize>,
}

impl std::fmt::Debug for EmbeddingModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingModelConfig")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("has_api_key", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl Default for EmbeddingModelConfig {
    fn default() -> Self {
        Self::new(EmbeddingModelKind::Qwen, DEFAULT_QWEN_MODEL)
    }
}

impl EmbeddingModelConfig {
    pub fn new(kind: EmbeddingModelKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            api_key: None,
            base_url: None,
            dimensions: None,
        }
    }

    pub fn qwen(name: impl Into<String>) -> Self {
        Self::new(EmbeddingModelKind::Qwen, name)
    }

    pub fn openai(name: impl Into<String>) -> Self {
        Self::new(EmbeddingModelKind::OpenAi, name)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    /// Endpoint to talk to, without trailing slash
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Configured API key, or the kind's environment variable
    pub fn resolve_api_key(&self) -> Result<String, DomainError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }

        std::env::var(self.kind.api_key_env())
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "No API key for {} embedding model '{}': set api_key or {}",
                    self.kind,
                    self.name,
                    self.kind.api_key_env()
                ))
            })
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("Embedding model name cannot be empty"));
        }

        if self.dimensions == Some(0) {
            return Err(DomainError::validation(format!(
                "Embedding model '{}' dimensions must be greater than zero",
                self.name
            )));
        }

        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(DomainError::validation(format!(
                    "Embedding model '{}' base_url must be an http(s) URL, got '{}'",
                    self.name, url
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_qwen() {
        let config = EmbeddingModelConfig::default();

        assert_eq!(config.kind, EmbeddingModelKind::Qwen);
        assert_eq!(config.name, "text-embedding-v4");
        assert_eq!(
            config.effective_base_url(),
            "https://dashscope.aliyuncs.com/compatible-mode/v1"
        );
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("qwen".parse::<EmbeddingModelKind>().unwrap(), EmbeddingModelKind::Qwen);
        assert_eq!("DashScope".parse::<EmbeddingModelKind>().unwrap(), EmbeddingModelKind::Qwen);
        assert_eq!("openai".parse::<EmbeddingModelKind>().unwrap(), EmbeddingModelKind::OpenAi);
        assert!("huggingface".parse::<EmbeddingModelKind>().is_err());
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let config = EmbeddingModelConfig::openai("nomic-embed-text")
            .with_base_url("http://localhost:11434/v1/");

        assert_eq!(config.effective_base_url(), "http://localhost:11434/v1");
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let config = EmbeddingModelConfig::qwen("text-embedding-v4").with_api_key("sk-explicit");

        assert_eq!(config.resolve_api_key().unwrap(), "sk-explicit");
    }

    #[test]
    fn test_validate() {
        assert!(EmbeddingModelConfig::default().validate().is_ok());
        assert!(EmbeddingModelConfig::openai("  ").validate().is_err());
        assert!(EmbeddingModelConfig::openai("m").with_dimensions(0).validate().is_err());
        assert!(EmbeddingModelConfig::openai("m")
            .with_base_url("localhost:8080")
            .validate()
            .is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = EmbeddingModelConfig::default().with_api_key("sk-secret");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("has_api_key: true"));
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: EmbeddingModelConfig = serde_json::from_value(serde_json::json!({
            "kind": "openai",
            "name": "text-embedding-3-large",
            "dimensions": 1024
        }))
        .unwrap();

        assert_eq!(config.kind, EmbeddingModelKind::OpenAi);
        assert_eq!(config.dimensions, Some(1024));
        assert!(config.api_key.is_none());
    }
}
