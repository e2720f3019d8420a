//! Embed command - prints embeddings for the given texts

use clap::Args;
use serde::Serialize;

use super::{bootstrap, resolve_model};

/// Arguments for the embed command
#[derive(Args, Clone)]
pub struct EmbedArgs {
    /// Model key (defaults to the configured default model)
    #[arg(long, short)]
    pub model: Option<String>,

    /// Texts to embed
    #[arg(required = true, num_args = 1..)]
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
struct EmbedOutput<'a> {
    provider: &'a str,
    model: &'a str,
    dimensions: Option<usize>,
    embeddings: Vec<Vec<f32>>,
}

/// Run the embed command
pub async fn run(args: EmbedArgs) -> anyhow::Result<()> {
    let ctx = bootstrap()?;
    let provider = resolve_model(&ctx.cache, args.model.as_deref()).await?;

    let embeddings = provider.embed_documents(args.texts).await?;
    let output = EmbedOutput {
        provider: provider.provider_name(),
        model: provider.model(),
        dimensions: embeddings.first().map(Vec::len),
        embeddings,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    ctx.report_metrics();
    Ok(())
}
