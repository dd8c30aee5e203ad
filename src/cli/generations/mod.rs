//! Generations command - inspects and prunes durable cache generations

use clap::Args;

use crate::config::AppConfig;
use crate::domain::{CacheStorage, GenerationId, PruneReport, lifecycle::prune_generations};
use crate::infrastructure::cache::CacheFactory;
use crate::infrastructure::logging;

/// Arguments for the generations command
#[derive(Args, Clone, Debug, Default)]
pub struct GenerationsArgs {
    /// Delete every generation except the current one
    #[arg(long)]
    pub prune: bool,
}

/// List (and optionally prune) cache generations
pub async fn run(args: GenerationsArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let current = config.proxy.generation_id()?;
    let storage = CacheFactory::create(&config.cache);

    if args.prune {
        let report = prune_generations(storage.as_ref(), &current).await?;
        print!("{}", render_prune(&report));

        if !report.failed.is_empty() {
            anyhow::bail!("{} generation(s) could not be deleted", report.failed.len());
        }
    } else {
        print!("{}", render_listing(storage.as_ref(), &current).await?);
    }

    Ok(())
}

async fn render_listing(
    storage: &dyn CacheStorage,
    current: &GenerationId,
) -> anyhow::Result<String> {
    let mut out = String::new();

    for name in storage.keys().await? {
        let entries = storage.open(&name).await?.keys().await?.len();
        let marker = if name == current.as_str() { "*" } else { " " };
        out.push_str(&format!("{} {} ({} entries)\n", marker, name, entries));
    }

    if out.is_empty() {
        out.push_str("No cache generations\n");
    }

    Ok(out)
}

fn render_prune(report: &PruneReport) -> String {
    let mut out = String::new();

    for name in &report.deleted {
        out.push_str(&format!("deleted {}\n", name));
    }

    for name in &report.failed {
        out.push_str(&format!("failed  {}\n", name));
    }

    if out.is_empty() {
        out.push_str("Nothing to prune\n");
    }

    out
}
