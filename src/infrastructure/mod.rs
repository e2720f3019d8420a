//! Infrastructure layer - cache core, HTTP clients, embedding providers and metrics

pub mod embedding;
pub mod http_client;
pub mod lazy_cache;
pub mod logging;
pub mod metrics;
