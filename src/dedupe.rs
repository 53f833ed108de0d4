//! Batch deduplication over normalized URL and title identity.

use std::collections::HashSet;
use tracing::debug;

use crate::item::FeedItem;
use crate::normalize::{normalize_title, normalize_url, title_fingerprint};
use crate::TARGET_DIGEST;

/// Drops every item whose normalized URL or title fingerprint already
/// appeared earlier in the batch; a hit on either key is enough. First-seen
/// order is preserved, so callers control which duplicate survives by how
/// they order the input. Items with neither a URL nor a usable title pass
/// through untouched: the empty-string keys are never inserted into the
/// seen sets.
pub fn dedupe_items(items: Vec<FeedItem>) -> Vec<FeedItem> {
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(items.len());

    for item in items {
        let url_key = normalize_url(&item.url);
        let has_title = !normalize_title(&item.title).is_empty();

        if !url_key.is_empty() && seen_urls.contains(&url_key) {
            debug!(target: TARGET_DIGEST, "Dropping duplicate URL: {}", item.url);
            continue;
        }
        if has_title {
            let title_key = title_fingerprint(&item.title);
            if seen_titles.contains(&title_key) {
                debug!(target: TARGET_DIGEST, "Dropping duplicate title: {}", item.title);
                continue;
            }
            seen_titles.insert(title_key);
        }
        if !url_key.is_empty() {
            seen_urls.insert(url_key);
        }
        unique.push(item);
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, url: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            url: url.to_string(),
            ..FeedItem::default()
        }
    }

    #[test]
    fn earlier_item_wins_after_tracking_params_stripped() {
        let items = vec![
            item("Story A", "http://x.com/a?utm_source=y"),
            item("Different title", "http://x.com/a"),
        ];
        let unique = dedupe_items(items);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].url, "http://x.com/a?utm_source=y");
    }

    #[test]
    fn duplicate_title_is_dropped_even_with_new_url() {
        let items = vec![
            item("Major breach at ACME", "http://a.example/1"),
            item("Major Breach at ACME!", "http://b.example/2"),
        ];
        assert_eq!(dedupe_items(items).len(), 1);
    }

    #[test]
    fn items_without_identity_always_pass_through() {
        let items = vec![item("", ""), item("", ""), item("!!!", "")];
        assert_eq!(dedupe_items(items).len(), 3);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let items = vec![
            item("Story A", "http://x.com/a"),
            item("Story A", "http://x.com/a?utm_medium=rss"),
            item("Story B", "http://x.com/b"),
        ];
        let once = dedupe_items(items);
        let twice = dedupe_items(once.clone());
        assert_eq!(once, twice);
    }
}
