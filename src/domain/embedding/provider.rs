//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::{EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;

/// A client bound to one embedding model
///
/// Instances are expensive to build and are shared between requests through
/// the embedding model cache.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate embeddings for the given input
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Model this client talks to
    fn model(&self) -> &str;

    /// Output dimensions, when known up front
    fn dimensions(&self) -> Option<usize>;

    /// Embed a single query text
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let response = self.embed(EmbeddingRequest::single(text)).await?;

        response
            .into_vectors()
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.provider_name(), "Empty embedding response"))
    }

    /// Embed a batch of documents, one vector per text in input order
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, DomainError> {
        let expected = texts.len();
        let vectors = self.embed(EmbeddingRequest::new(texts)).await?.into_vectors();

        if vectors.len() != expected {
            return Err(DomainError::provider(
                self.provider_name(),
                format!("Expected {} embeddings, got {}", expected, vectors.len()),
            ));
        }

        Ok(vectors)
    }
}
