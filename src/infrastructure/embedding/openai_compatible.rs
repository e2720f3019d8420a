//! Embedding client for the OpenAI `/embeddings` wire format
//!
//! DashScope exposes the same format under its compatible-mode endpoint, so
//! one client covers both backends; only the endpoint, the key and the batch
//! limit differ.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::embedding::{
    Embedding, EmbeddingModelKind, EmbeddingProvider, EmbeddingRequest, EmbeddingResponse,
    EmbeddingUsage,
};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

/// DashScope text-embedding-v3/v4 accept at most 10 texts per call
const QWEN_MAX_BATCH: usize = 10;
const OPENAI_MAX_BATCH: usize = 2048;

/// Embedding client bound to one model
#[derive(Debug)]
pub struct OpenAiCompatibleEmbeddingProvider {
    client: Arc<dyn HttpClientTrait>,
    kind: EmbeddingModelKind,
    auth_header: String,
    base_url: String,
    model: String,
    dimensions: Option<usize>,
    max_batch: usize,
}

impl OpenAiCompatibleEmbeddingProvider {
    pub fn new(
        client: Arc<dyn HttpClientTrait>,
        kind: EmbeddingModelKind,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let max_batch = match kind {
            EmbeddingModelKind::Qwen => QWEN_MAX_BATCH,
            EmbeddingModelKind::OpenAi => OPENAI_MAX_BATCH,
        };

        Self {
            client,
            kind,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            dimensions: None,
            max_batch,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Option<usize>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch.max(1);
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_body(&self, texts: &[String], dimensions: Option<usize>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "input": texts,
            "encoding_format": "float",
        });

        if let Some(dims) = dimensions {
            body["dimensions"] = serde_json::json!(dims);
        }

        body
    }

    /// Every input position in the batch must appear exactly once
    fn check_indices(&self, data: &[WireEmbedding], batch_len: usize) -> Result<(), DomainError> {
        let mut seen = vec![false; batch_len];

        for d in data {
            match seen.get_mut(d.index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(DomainError::provider(
                        self.provider_name(),
                        format!("Duplicate embedding index {} in response", d.index),
                    ));
                }
                None => {
                    return Err(DomainError::provider(
                        self.provider_name(),
                        format!(
                            "Embedding index {} out of range for a batch of {}",
                            d.index, batch_len
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<WireResponse, DomainError> {
        serde_json::from_value(json).map_err(|e| {
            DomainError::provider(
                self.provider_name(),
                format!("Failed to parse embedding response: {}", e),
            )
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatibleEmbeddingProvider {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        request.validate()?;

        let url = self.embeddings_url();
        let dimensions = request.dimensions().or(self.dimensions);
        let mut data = Vec::with_capacity(request.len());
        let mut usage = EmbeddingUsage::default();
        let mut model = self.model.clone();

        for (batch_idx, batch) in request.inputs().chunks(self.max_batch).enumerate() {
            let offset = batch_idx * self.max_batch;
            let body = self.build_body(batch, dimensions);
            let json = self.client.post_json(&url, self.headers(), &body).await?;
            let response = self.parse_response(json)?;

            if response.data.len() != batch.len() {
                return Err(DomainError::provider(
                    self.provider_name(),
                    format!(
                        "Expected {} embeddings, got {}",
                        batch.len(),
                        response.data.len()
                    ),
                ));
            }

            self.check_indices(&response.data, batch.len())?;

            data.extend(
                response
                    .data
                    .into_iter()
                    .map(|d| Embedding::new(offset + d.index, d.embedding)),
            );
            usage.prompt_tokens += response.usage.prompt_tokens;
            usage.total_tokens += response.usage.total_tokens;

            if let Some(m) = response.model {
                model = m;
            }
        }

        tracing::debug!(
            provider = self.provider_name(),
            model = %self.model,
            inputs = request.len(),
            total_tokens = usage.total_tokens,
            "Generated embeddings"
        );

        Ok(EmbeddingResponse::new(model, data, usage))
    }

    fn provider_name(&self) -> &'static str {
        self.kind.as_str()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    model: Option<String>,
    data: Vec<WireEmbedding>,
    #[serde(default)]
    usage: WireUsage,
}

#[derive(Debug, Deserialize)]
struct WireEmbedding {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const URL: &str = "https://dashscope.test/v1/embeddings";

    fn response_for(count: usize) -> serde_json::Value {
        let data: Vec<_> = (0..count)
            .map(|i| serde_json::json!({ "index": i, "embedding": [i as f32, 1.0] }))
            .collect();

        serde_json::json!({
            "model": "text-embedding-v4",
            "data": data,
            "usage": { "prompt_tokens": 3, "total_tokens": 3 }
        })
    }

    fn provider(client: Arc<MockHttpClient>) -> OpenAiCompatibleEmbeddingProvider {
        OpenAiCompatibleEmbeddingProvider::new(
            client,
            EmbeddingModelKind::Qwen,
            "sk-test",
            "https://dashscope.test/v1/",
            "text-embedding-v4",
        )
    }

    #[tokio::test]
    async fn test_embed_single() {
        let client = Arc::new(MockHttpClient::new().with_response(URL, response_for(1)));
        let provider = provider(client.clone());

        let vector = provider.embed_query("hello").await.unwrap();

        assert_eq!(vector, vec![0.0, 1.0]);
        assert_eq!(client.calls(), 1);

        let body = &client.requests()[0];
        assert_eq!(body["model"], "text-embedding-v4");
        assert_eq!(body["input"], serde_json::json!(["hello"]));
        assert!(body.get("dimensions").is_none());
    }

    #[tokio::test]
    async fn test_embed_splits_large_batches() {
        let client = Arc::new(MockHttpClient::new().with_response(URL, response_for(2)));
        let provider = provider(client.clone()).with_max_batch(2);

        let response = provider
            .embed(EmbeddingRequest::new(vec![
                "a".into(),
                "b".into(),
                "c".into(),
                "d".into(),
            ]))
            .await
            .unwrap();

        assert_eq!(client.calls(), 2);
        let indices: Vec<usize> = response.embeddings().iter().map(|e| e.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(response.usage().total_tokens, 6);
    }

    #[tokio::test]
    async fn test_embed_rejects_short_response() {
        let client = Arc::new(MockHttpClient::new().with_response(URL, response_for(1)));
        let provider = provider(client);

        let err = provider
            .embed_documents(vec!["a".into(), "b".into()])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Expected 2 embeddings"));
    }

    #[tokio::test]
    async fn test_embed_rejects_duplicate_index() {
        let response = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.1, 0.2] },
                { "index": 1, "embedding": [0.3, 0.4] }
            ]
        });
        let client = Arc::new(MockHttpClient::new().with_response(URL, response));
        let provider = provider(client);

        let err = provider
            .embed_documents(vec!["a".into(), "b".into()])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Duplicate embedding index 1"));
    }

    #[tokio::test]
    async fn test_embed_rejects_out_of_range_index() {
        let response = serde_json::json!({
            "data": [
                { "index": 0, "embedding": [0.1, 0.2] },
                { "index": 5, "embedding": [0.3, 0.4] }
            ]
        });
        let client = Arc::new(MockHttpClient::new().with_response(URL, response));
        let provider = provider(client);

        let err = provider
            .embed_documents(vec!["a".into(), "b".into()])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("out of range"));
    }

    #[tokio::test]
    async fn test_embed_restores_input_order() {
        let response = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [0.3, 0.4] },
                { "index": 0, "embedding": [0.1, 0.2] }
            ]
        });
        let client = Arc::new(MockHttpClient::new().with_response(URL, response));
        let provider = provider(client);

        let vectors = provider
            .embed_documents(vec!["a".into(), "b".into()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn test_embed_sends_dimensions() {
        let client = Arc::new(MockHttpClient::new().with_response(URL, response_for(1)));
        let provider = provider(client.clone()).with_dimensions(Some(512));

        provider.embed_query("hello").await.unwrap();

        assert_eq!(client.requests()[0]["dimensions"], 512);
        assert_eq!(provider.dimensions(), Some(512));
    }

    #[tokio::test]
    async fn test_embed_propagates_http_error() {
        let client = Arc::new(MockHttpClient::new().with_error(URL, "HTTP 401: invalid key"));
        let provider = provider(client);

        let err = provider.embed_query("hello").await.unwrap_err();

        assert!(err.to_string().contains("invalid key"));
    }

    #[tokio::test]
    async fn test_empty_input_never_hits_network() {
        let client = Arc::new(MockHttpClient::new());
        let provider = provider(client.clone());

        assert!(provider.embed(EmbeddingRequest::new(vec![])).await.is_err());
        assert_eq!(client.calls(), 0);
    }

    #[test]
    fn test_provider_name_follows_kind() {
        let client: Arc<dyn HttpClientTrait> = Arc::new(MockHttpClient::new());
        let provider = OpenAiCompatibleEmbeddingProvider::new(
            client,
            EmbeddingModelKind::OpenAi,
            "sk",
            "https://api.openai.com/v1",
            "text-embedding-3-small",
        );

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model(), "text-embedding-3-small");
    }
}
