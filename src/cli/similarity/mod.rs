//! Similarity command - cosine similarity of two texts

use clap::Args;

use super::{bootstrap, resolve_model};
use crate::domain::cosine_similarity;

/// Arguments for the similarity command
#[derive(Args, Clone)]
pub struct SimilarityArgs {
    /// Model key (defaults to the configured default model)
    #[arg(long, short)]
    pub model: Option<String>,

    pub first: String,

    pub second: String,
}

/// Run the similarity command
pub async fn run(args: SimilarityArgs) -> anyhow::Result<()> {
    let ctx = bootstrap()?;
    let provider = resolve_model(&ctx.cache, args.model.as_deref()).await?;

    let vectors = provider
        .embed_documents(vec![args.first, args.second])
        .await?;
    let score = cosine_similarity(&vectors[0], &vectors[1]);

    println!("{:.6}", score);
    ctx.report_metrics();
    Ok(())
}
