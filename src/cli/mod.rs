//! CLI module for the embedding model cache
//!
//! Subcommands share one process-wide model cache built from the layered
//! application configuration:
//! - `embed`: embed texts with a cached model
//! - `warm`: construct configured models up front
//! - `similarity`: compare two texts

pub mod embed;
pub mod similarity;
pub mod warm;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::EmbeddingProvider;
use crate::infrastructure::embedding::EmbeddingModelCache;
use crate::infrastructure::logging;
use crate::infrastructure::metrics::{self, PrometheusMetrics};

/// Embedding model cache - shared, lazily built embedding clients
#[derive(Parser)]
#[command(name = "embedding-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Embed one or more texts and print the vectors as JSON
    Embed(embed::EmbedArgs),

    /// Build configured models ahead of first use
    Warm(warm::WarmArgs),

    /// Cosine similarity between two texts
    Similarity(similarity::SimilarityArgs),
}

/// What every subcommand runs against
pub(crate) struct CommandContext {
    pub cache: EmbeddingModelCache,
    metrics: Option<PrometheusMetrics>,
}

impl CommandContext {
    /// Write the collected metrics to stderr when metrics are enabled
    pub fn report_metrics(&self) {
        if let Some(metrics) = &self.metrics {
            eprintln!("{}", metrics.render());
        }
    }
}

/// Load configuration, start logging and metrics, and build the model cache
pub(crate) fn bootstrap() -> anyhow::Result<CommandContext> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);
    let metrics = metrics::init_metrics(&config.metrics);

    Ok(CommandContext {
        cache: crate::create_model_cache(&config)?,
        metrics,
    })
}

/// Configured model for `key`, or the default model
pub(crate) async fn resolve_model(
    cache: &EmbeddingModelCache,
    key: Option<&str>,
) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let provider = match key {
        Some(key) => cache.get_named(key).await?,
        None => cache.get_default().await?,
    };

    Ok(provider)
}
