//! RSS/Atom feed ingestion.

use std::io;

use anyhow::{anyhow, Result};
use feed_rs::parser;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::item::FeedItem;
use crate::TARGET_WEB_REQUEST;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(5);
const MAX_RETRIES: usize = 3;
const USER_AGENT: &str = "threat-digest/0.3";

/// Fetches every feed once and flattens the entries into items, preserving
/// feed order. A failing feed is logged and skipped; it never aborts the
/// batch.
pub async fn fetch_feed_items(feed_urls: &[String]) -> Vec<FeedItem> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    let mut items = Vec::new();
    for feed_url in feed_urls {
        if feed_url.trim().is_empty() {
            warn!(target: TARGET_WEB_REQUEST, "Skipping empty feed URL");
            continue;
        }
        match fetch_one_feed(&client, feed_url).await {
            Ok(mut feed_items) => {
                info!(
                    target: TARGET_WEB_REQUEST,
                    "Fetched {} entries from {}", feed_items.len(), feed_url
                );
                items.append(&mut feed_items);
            }
            Err(err) => {
                error!(target: TARGET_WEB_REQUEST, "Failed to process feed {}: {}", feed_url, err);
            }
        }
    }
    items
}

async fn fetch_one_feed(client: &reqwest::Client, feed_url: &str) -> Result<Vec<FeedItem>> {
    let mut attempts = 0;
    loop {
        debug!(target: TARGET_WEB_REQUEST, "Loading feed from {}", feed_url);
        match timeout(REQUEST_TIMEOUT, client.get(feed_url).send()).await {
            Ok(Ok(response)) if response.status().is_success() => {
                let body = response.text().await?;
                return parse_feed(&body, feed_url);
            }
            Ok(Ok(response)) => {
                warn!(
                    target: TARGET_WEB_REQUEST,
                    "Non-success status {} from {}", response.status(), feed_url
                );
            }
            Ok(Err(err)) => {
                warn!(target: TARGET_WEB_REQUEST, "Request to {} failed: {}", feed_url, err);
            }
            Err(_) => {
                warn!(target: TARGET_WEB_REQUEST, "Request to {} timed out", feed_url);
            }
        }

        attempts += 1;
        if attempts >= MAX_RETRIES {
            return Err(anyhow!("max retries reached for {}", feed_url));
        }
        debug!(target: TARGET_WEB_REQUEST, "Retrying {} in {:?}", feed_url, RETRY_DELAY);
        sleep(RETRY_DELAY).await;
    }
}

fn parse_feed(body: &str, feed_url: &str) -> Result<Vec<FeedItem>> {
    let reader = io::Cursor::new(body);
    let feed = parser::parse(reader)?;
    let source = feed
        .title
        .as_ref()
        .map(|title| title.content.clone())
        .unwrap_or_else(|| feed_url.to_string());

    let mut items = Vec::new();
    for entry in feed.entries {
        // Some feeds only carry a permalink in the entry id.
        let url = entry
            .links
            .first()
            .map(|link| link.href.clone())
            .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))
            .unwrap_or_default();
        let title = entry
            .title
            .as_ref()
            .map(|title| title.content.trim().to_string())
            .unwrap_or_default();
        if url.is_empty() && title.is_empty() {
            warn!(target: TARGET_WEB_REQUEST, "Feed entry missing link and title, skipping");
            continue;
        }

        let published_at = entry.published.or(entry.updated);
        items.push(FeedItem {
            title,
            url,
            source: source.clone(),
            published: published_at.map(|date| date.to_rfc2822()).unwrap_or_default(),
            published_at,
            summary: entry
                .summary
                .as_ref()
                .map(|summary| summary.content.clone())
                .unwrap_or_default(),
            enrichment: None,
        });
    }
    Ok(items)
}
