//! Cluster-level scoring and labeling.

use super::types::TopicCluster;
use crate::normalize::contains_term;
use crate::relevance::{item_text, score_item};

/// Flat bonus when more than one item corroborates a story.
const MULTI_ITEM_BONUS: i64 = 1;

/// Label table scanned in order; every label with a keyword hit is
/// attached, so labels are not mutually exclusive.
const LABEL_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "ACTIVE_EXPLOITATION",
        &["actively exploited", "in the wild", "active exploitation"],
    ),
    ("KEV_ADDED", &["kev", "known exploited", "emergency directive"]),
    (
        "GUIDANCE",
        &["guidance", "advisory", "best practice", "recommendations"],
    ),
    (
        "PATCH_RELEASE",
        &["patch", "update", "fixed", "release", "hotfix"],
    ),
    ("INDUSTRY_SIGNAL", &["report", "trend", "survey", "outlook"]),
    (
        "LEGAL_POLICY",
        &["law", "regulation", "policy", "compliance", "sanction"],
    ),
    ("RESEARCH", &["research", "analysis", "disclosure", "paper"]),
];

const FALLBACK_LABEL: &str = "INDUSTRY_SIGNAL";

/// Cluster importance: the strongest member signal plus a corroboration
/// bonus. Max, not sum, so a pile of weak near-duplicates cannot outrank
/// one high-confidence story.
pub fn score_cluster(cluster: &TopicCluster) -> i64 {
    let base = cluster.items.iter().map(score_item).max().unwrap_or(0);
    if cluster.items.len() > 1 {
        base + MULTI_ITEM_BONUS
    } else {
        base
    }
}

/// Category labels for a cluster, scanned over the concatenated plain text
/// of all members. Every cluster gets at least one label.
pub fn label_cluster(cluster: &TopicCluster) -> Vec<String> {
    let text = cluster
        .items
        .iter()
        .map(item_text)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let mut labels: Vec<String> = Vec::new();
    for (label, keywords) in LABEL_KEYWORDS {
        if keywords.iter().any(|keyword| contains_term(&text, keyword)) {
            labels.push((*label).to_string());
        }
    }
    if labels.is_empty() {
        labels.push(FALLBACK_LABEL.to_string());
    }
    labels
}
