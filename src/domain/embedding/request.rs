//! Embedding request types

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Texts to embed with a model-bound provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

impl EmbeddingRequest {
    pub fn new(input: Vec<String>) -> Self {
        Self {
            input,
            dimensions: None,
        }
    }

    /// Request for a single text
    pub fn single(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    /// Set the output dimensions
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn inputs(&self) -> &[String] {
        &self.input
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.input.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Reject empty batches and blank texts before they reach a provider
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.input.is_empty() {
            return Err(DomainError::validation("Embedding request has no input"));
        }

        if let Some(idx) = self.input.iter().position(|t| t.trim().is_empty()) {
            return Err(DomainError::validation(format!(
                "Embedding input at index {} is empty",
                idx
            )));
        }

        Ok(())
    }
}
