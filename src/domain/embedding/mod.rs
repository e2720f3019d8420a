//! Embedding model domain types and traits

mod model_config;
mod provider;
mod request;
mod response;

pub use model_config::{EmbeddingModelConfig, EmbeddingModelKind, DEFAULT_MODEL_KEY};
pub use provider::EmbeddingProvider;
pub use request::EmbeddingRequest;
pub use response::{cosine_similarity, Embedding, EmbeddingResponse, EmbeddingUsage};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
