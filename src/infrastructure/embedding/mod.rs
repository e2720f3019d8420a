//! Embedding provider implementations and the shared model cache

mod factory;
mod model_cache;
mod openai_compatible;

pub use factory::EmbeddingProviderFactory;
pub use model_cache::{EmbeddingModelCache, EmbeddingModelCacheConfig};
pub use openai_compatible::OpenAiCompatibleEmbeddingProvider;
