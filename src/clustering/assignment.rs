//! Item key extraction and greedy cluster assignment.

use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;
use tracing::debug;

use super::types::TopicCluster;
use crate::item::FeedItem;
use crate::normalize::{contains_term, extract_plain_text};
use crate::relevance::CVE_RE;
use crate::TARGET_DIGEST;

/// Canonical token-overlap threshold for joining an existing cluster.
/// 0.35 favors recall; raise it to make clusters tighter.
pub const OVERLAP_THRESHOLD: f64 = 0.35;

/// Vendor and product names used to anchor topic keys.
const VENDOR_HINTS: [&str; 24] = [
    "cisco",
    "microsoft",
    "google",
    "apple",
    "ivanti",
    "fortinet",
    "palo alto",
    "crowdstrike",
    "okta",
    "citrix",
    "vmware",
    "linux",
    "windows",
    "amazon",
    "aws",
    "azure",
    "gcp",
    "oracle",
    "sap",
    "atlassian",
    "mongodb",
    "postgres",
    "nginx",
    "apache",
];

/// Exploit techniques, checked in order; the first hit becomes the key.
const EXPLOIT_TECHNIQUES: [&str; 8] = [
    "zero-day",
    "0-day",
    "rce",
    "auth bypass",
    "privilege escalation",
    "sql injection",
    "path traversal",
    "command injection",
];

const STOPWORDS: [&str; 29] = [
    "the", "a", "an", "and", "or", "of", "to", "in", "for", "on", "with", "at", "by", "from",
    "over", "about", "after", "before", "as", "is", "are", "be", "this", "that", "new", "report",
    "reports", "update", "updates",
];

lazy_static! {
    /// Vendor hints longest-first so "palo alto" is never shadowed by a
    /// shorter hint inside it.
    static ref VENDORS_BY_LENGTH: Vec<&'static str> = {
        let mut vendors = VENDOR_HINTS.to_vec();
        vendors.sort_by_key(|vendor| std::cmp::Reverse(vendor.len()));
        vendors
    };
    static ref STOPWORD_SET: HashSet<&'static str> = STOPWORDS.iter().copied().collect();
}

/// The deterministic keys derived from one item's text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemKeys {
    pub topic: String,
    pub vendor: String,
    pub exploit: String,
}

/// Significant tokens: lowercased alphanumeric runs, stopwords and tokens
/// of two characters or fewer excluded.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() > 2 && !STOPWORD_SET.contains(token))
        .map(|token| token.to_string())
        .collect()
}

/// Jaccard similarity between two token sets; empty sets never match.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Derives the topic, vendor, and exploit keys for one item:
/// a CVE identifier wins outright; otherwise a vendor hint anchors
/// `"<vendor> <first-significant-title-token>"`, suffixed with the exploit
/// technique when one is present; otherwise the three most frequent
/// significant title tokens, or the literal key "misc".
pub fn extract_keys(item: &FeedItem) -> ItemKeys {
    let combined = format!("{} {}", item.title, extract_plain_text(&item.summary));
    let lower = combined.to_lowercase();

    let vendor = VENDORS_BY_LENGTH
        .iter()
        .find(|hint| contains_term(&lower, hint))
        .map(|hint| hint.to_string())
        .unwrap_or_default();
    let exploit = EXPLOIT_TECHNIQUES
        .iter()
        .find(|technique| contains_term(&lower, technique))
        .map(|technique| technique.to_string())
        .unwrap_or_default();

    if let Some(matched) = CVE_RE.find(&combined) {
        return ItemKeys {
            topic: matched.as_str().to_uppercase(),
            vendor,
            exploit,
        };
    }

    let tokens = tokenize(&item.title);

    if !vendor.is_empty() {
        let mut topic = match tokens.first() {
            Some(first) => format!("{} {}", vendor, first),
            None => vendor.clone(),
        };
        if !exploit.is_empty() {
            topic = format!("{} {}", topic, exploit);
        }
        return ItemKeys { topic, vendor, exploit };
    }

    if tokens.is_empty() {
        return ItemKeys {
            topic: "misc".to_string(),
            vendor,
            exploit,
        };
    }

    ItemKeys {
        topic: top_tokens(&tokens, 3).join(" "),
        vendor,
        exploit,
    }
}

/// The `limit` most frequent tokens; ties keep first-occurrence order.
fn top_tokens(tokens: &[String], limit: usize) -> Vec<String> {
    let mut counts: HashMap<&String, usize> = HashMap::new();
    let mut order: Vec<&String> = Vec::new();
    for token in tokens {
        let count = counts.entry(token).or_insert(0);
        if *count == 0 {
            order.push(token);
        }
        *count += 1;
    }
    order.sort_by_key(|token| std::cmp::Reverse(counts[token]));
    order.into_iter().take(limit).cloned().collect()
}

/// Groups items into clusters in a single greedy pass. Items are processed
/// in sequence order against clusters in creation order, so the final
/// partition depends on arrival order by design; there is no backtracking
/// and no merge or split after assignment.
pub fn cluster_items(items: &[FeedItem]) -> Vec<TopicCluster> {
    let mut clusters: Vec<TopicCluster> = Vec::new();

    for item in items {
        let keys = extract_keys(item);
        let tokens: HashSet<String> = tokenize(&item.title).into_iter().collect();

        match find_cluster(&clusters, &keys, &tokens) {
            Some(index) => {
                let cluster = &mut clusters[index];
                debug!(
                    target: TARGET_DIGEST,
                    "Assigning '{}' to cluster '{}'", item.title, cluster.topic_key
                );
                cluster.items.push(item.clone());
                cluster.tokens.extend(tokens);
            }
            None => {
                debug!(target: TARGET_DIGEST, "New cluster '{}'", keys.topic);
                clusters.push(TopicCluster {
                    topic_key: keys.topic,
                    vendor_key: keys.vendor,
                    exploit_key: keys.exploit,
                    items: vec![item.clone()],
                    tokens,
                });
            }
        }
    }

    clusters
}

/// The assignment cascade. An exact topic-key match beats a vendor plus
/// technique match, which beats token overlap; within each rule the
/// earliest-created cluster wins. The vendor rule captures same-vendor
/// multi-CVE campaigns: the item joins when its vendor matches the
/// cluster's and the item carries any exploit-technique key of its own.
fn find_cluster(
    clusters: &[TopicCluster],
    keys: &ItemKeys,
    tokens: &HashSet<String>,
) -> Option<usize> {
    if let Some(index) = clusters.iter().position(|c| c.topic_key == keys.topic) {
        return Some(index);
    }

    if !keys.vendor.is_empty() && !keys.exploit.is_empty() {
        if let Some(index) = clusters.iter().position(|c| c.vendor_key == keys.vendor) {
            return Some(index);
        }
    }

    clusters
        .iter()
        .position(|c| jaccard(&c.tokens, tokens) >= OVERLAP_THRESHOLD)
}
