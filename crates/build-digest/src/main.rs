use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    seed_history, save_digest, ClaudeSummarizer, Config, ContentExtractor, FeedReader,
    Orchestrator, RepetitionGuard,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "build-digest")]
#[command(about = "Summarize the latest feed articles into three-line digest cards")]
struct Args {
    /// Where to write the digest JSON (overrides DIGEST_PATH)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of articles to process (overrides MAX_ARTICLES)
    #[arg(short, long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("shared=info".parse()?)
                .add_directive("build_digest=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let output = args.output.unwrap_or_else(|| config.digest_path.clone());
    let max_articles = args.limit.unwrap_or(config.max_articles);

    println!("📚 Loading previous digest...");
    let mut history = seed_history(&output, config.history_limit, config.first_word_cap);
    println!("✓ Seeded {} teaser openers", history.seeded_len());

    println!("\n📰 Fetching feed...");
    let reader = FeedReader::new()?;
    let items = reader
        .fetch(&config.feed_url, max_articles)
        .await
        .context("Failed to fetch feed")?;

    if items.is_empty() {
        println!("No articles found in {}.", config.feed_url);
        return Ok(());
    }
    println!("✓ Found {} articles", items.len());

    let extractor = ContentExtractor::new()?;
    let summarizer = ClaudeSummarizer::new(config.anthropic_api_key.clone(), config.model.clone())?;
    let guard = match config.seed {
        Some(seed) => RepetitionGuard::with_seed(seed),
        None => RepetitionGuard::from_entropy(),
    };

    println!("\n🤖 Building digest cards...");
    println!("  (Pacing requests {}ms apart)", config.pace.as_millis());
    let mut orchestrator = Orchestrator::new(&extractor, &summarizer, guard, config.pace);
    let results = orchestrator.run_batch(&items, &mut history).await;

    println!("✓ Built {}/{} cards", results.len(), items.len());
    info!(openers = history.openers().len(), "history after run");

    let path = save_digest(&output, &results).context("Failed to save digest")?;
    println!("\n✅ Digest saved to: {}", path.display());

    Ok(())
}
