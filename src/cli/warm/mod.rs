//! Warm command - builds configured models concurrently

use clap::Args;
use tracing::info;

use super::bootstrap;

/// Arguments for the warm command
#[derive(Args, Clone)]
pub struct WarmArgs {
    /// Model keys to build (defaults to every configured model)
    pub keys: Vec<String>,
}

/// Run the warm command
pub async fn run(args: WarmArgs) -> anyhow::Result<()> {
    let ctx = bootstrap()?;
    let cache = &ctx.cache;

    let keys = if args.keys.is_empty() {
        cache.configured_keys()
    } else {
        args.keys
    };

    info!(keys = ?keys, "Warming embedding models");

    let results = cache.warm_up(&keys).await;
    let mut failed = 0;

    for (key, result) in &results {
        match result {
            Ok(()) => println!("{:<24} {}", key, cache.state(key).await),
            Err(e) => {
                failed += 1;
                println!("{:<24} failed: {}", key, e);
            }
        }
    }

    ctx.report_metrics();

    if failed > 0 {
        anyhow::bail!("{} of {} models failed to build", failed, results.len());
    }

    Ok(())
}
