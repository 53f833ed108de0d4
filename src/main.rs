use std::cmp::Reverse;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

use threat_digest::clustering::cluster_items;
use threat_digest::config::{llm_params_from_env, load_feed_urls};
use threat_digest::dedupe::dedupe_items;
use threat_digest::editorial::{build_editorial, MAX_CLUSTERS};
use threat_digest::item::FeedItem;
use threat_digest::logging::configure_logging;
use threat_digest::relevance::{filter_items, score_item};
use threat_digest::render::render_digest;
use threat_digest::rss::fetch_feed_items;
use threat_digest::state::RunState;
use threat_digest::summarize::{enrich_item, generate_themes};
use threat_digest::{LLMParams, TARGET_DIGEST};

/// Daily security-news digest generator.
#[derive(Debug, Parser)]
#[command(name = "threat-digest", version, about)]
struct Cli {
    /// Path to the JSON config file with the feed list.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Where to write the rendered Markdown digest.
    #[arg(long, default_value = "digest.md")]
    output: PathBuf,

    /// Path to the persisted run state.
    #[arg(long, default_value = "state.json")]
    state: PathBuf,

    /// Writing tone for generated copy: "spicy" or "plain".
    #[arg(long, default_value = "spicy")]
    tone: String,

    /// Maximum clusters surfaced in the digest.
    #[arg(long, default_value_t = MAX_CLUSTERS)]
    max_clusters: usize,

    /// Maximum items handed to the summarizer per run.
    #[arg(long, default_value_t = 20)]
    max_items: usize,

    /// Skip all LLM calls; items go through unenriched and themes are
    /// omitted.
    #[arg(long)]
    skip_llm: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let feed_urls = load_feed_urls(&cli.config);
    let mut state = RunState::load(&cli.state);

    let fetched = fetch_feed_items(&feed_urls).await;
    info!(target: TARGET_DIGEST, "Fetched {} items from {} feeds", fetched.len(), feed_urls.len());

    let mut items: Vec<FeedItem> = fetched
        .into_iter()
        .filter(|item| item.url.is_empty() || state.should_process(&item.url))
        .collect();
    items = dedupe_items(items);
    info!(target: TARGET_DIGEST, "{} new items after dedupe", items.len());

    let mut relevant = filter_items(&items);
    if relevant.is_empty() && !items.is_empty() {
        warn!(
            target: TARGET_DIGEST,
            "No items passed the relevance filter; falling back to the full batch"
        );
        relevant = items.clone();
    }

    relevant.sort_by_key(|item| Reverse(score_item(item)));
    relevant.truncate(cli.max_items);

    let selected = if cli.skip_llm {
        info!(target: TARGET_DIGEST, "Skipping enrichment (--skip-llm)");
        relevant
    } else {
        let params = llm_params_from_env(true);
        enrich_batch(relevant, &params, &cli.tone).await
    };
    info!(target: TARGET_DIGEST, "{} items selected for the digest", selected.len());

    let clusters = cluster_items(&selected);
    let editorial = build_editorial(&clusters, cli.max_clusters);

    let themes = if cli.skip_llm {
        None
    } else {
        let params = llm_params_from_env(true);
        generate_themes(&selected, &params).await
    };

    let now = Utc::now();
    let digest = render_digest(
        &now.format("%Y-%m-%d").to_string(),
        &now.to_rfc3339(),
        &editorial,
        themes.as_ref(),
        &cli.tone,
    );
    fs::write(&cli.output, &digest)?;
    info!(target: TARGET_DIGEST, "Wrote digest to {}", cli.output.display());

    for item in &items {
        state.mark_processed(&item.url);
    }
    state.last_run_utc = now.to_rfc3339();
    state.save(&cli.state)?;

    Ok(())
}

/// Enriches each item in turn; items the model cannot describe in valid
/// JSON are dropped from the digest.
async fn enrich_batch(items: Vec<FeedItem>, params: &LLMParams, tone: &str) -> Vec<FeedItem> {
    let mut enriched = Vec::with_capacity(items.len());
    for mut item in items {
        match enrich_item(&item, params, tone).await {
            Some(enrichment) => {
                item.enrichment = Some(enrichment);
                enriched.push(item);
            }
            None => {
                warn!(target: TARGET_DIGEST, "Dropping item without enrichment: {}", item.title);
            }
        }
    }
    enriched
}
