//! Domain layer - embedding types and errors

pub mod embedding;
pub mod error;

pub use embedding::{
    cosine_similarity, Embedding, EmbeddingModelConfig, EmbeddingModelKind, EmbeddingProvider,
    EmbeddingRequest, EmbeddingResponse, EmbeddingUsage, DEFAULT_MODEL_KEY,
};
pub use error::DomainError;
