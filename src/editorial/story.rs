//! Projection of one cluster into the externally visible digest story.

use std::collections::HashSet;

use serde::Serialize;

use super::signals::SignalBundle;
use crate::clustering::{label_cluster, TopicCluster};
use crate::item::{Confidence, FeedItem, Risk};
use crate::relevance::score_item;

/// Sources listed per story.
const MAX_SOURCES: usize = 3;
/// Merged beginner-breakdown entries kept per story.
const MAX_BREAKDOWN: usize = 6;
/// Narrative bullets per story.
const MAX_STORY_LINES: usize = 8;
/// Below this many bullets a filler line is appended.
const MIN_STORY_LINES: usize = 4;

const FILLER_LINE: &str = "- Details are still developing; check the linked sources for updates.";

/// One source credit: where a member item came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published: String,
}

/// The rendered view of one cluster.
#[derive(Debug, Clone, Serialize)]
pub struct Story {
    pub cluster_id: String,
    pub cluster_title: String,
    pub vendor_key: String,
    pub labels: Vec<String>,
    pub risk: Risk,
    pub confidence: Confidence,
    pub attack_stage: String,
    pub why_this_is_here: String,
    pub spicy_take: String,
    pub tl_dr: String,
    pub the_story: String,
    pub beginner_breakdown: Vec<String>,
    pub soc_focus: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub sources: Vec<SourceRef>,
    pub score: i64,
}

impl Story {
    pub fn from_cluster(cluster: &TopicCluster, score: i64) -> Self {
        let fallback = FeedItem::default();
        let primary = primary_item(&cluster.items).unwrap_or(&fallback);
        let sources = merge_sources(&cluster.items);
        let signals = SignalBundle::from_cluster(cluster);
        let enrichment = primary.enrichment.as_ref();

        Story {
            cluster_id: cluster.topic_key.clone(),
            cluster_title: if primary.title.is_empty() {
                "Untitled".to_string()
            } else {
                primary.title.clone()
            },
            vendor_key: cluster.vendor_key.clone(),
            labels: label_cluster(cluster),
            risk: aggregate_risk(&cluster.items),
            confidence: signals.confidence(),
            attack_stage: enrichment
                .map(|e| e.attack_stage.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            why_this_is_here: signals.why_here(),
            spicy_take: enrichment.map(|e| e.spicy_take.clone()).unwrap_or_default(),
            tl_dr: enrichment.map(|e| e.tl_dr.clone()).unwrap_or_default(),
            the_story: story_lines(primary, &sources).join("\n"),
            beginner_breakdown: merge_breakdowns(&cluster.items),
            soc_focus: enrichment.map(|e| e.soc_focus.clone()).unwrap_or_default(),
            recommended_actions: enrichment
                .map(|e| e.recommended_actions.clone())
                .unwrap_or_default(),
            sources,
            score,
        }
    }
}

/// The highest-scoring member; the earliest member wins ties.
fn primary_item(items: &[FeedItem]) -> Option<&FeedItem> {
    let mut best: Option<(&FeedItem, i64)> = None;
    for item in items {
        let score = score_item(item);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((item, score));
        }
    }
    best.map(|(item, _)| item)
}

/// Member source tuples, deduplicated by URL, in member order, capped.
fn merge_sources(items: &[FeedItem]) -> Vec<SourceRef> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut sources = Vec::new();
    for item in items {
        if item.url.is_empty() || !seen.insert(item.url.as_str()) {
            continue;
        }
        sources.push(SourceRef {
            title: item.title.clone(),
            url: item.url.clone(),
            source: item.source.clone(),
            published: item.published.clone(),
        });
        if sources.len() >= MAX_SOURCES {
            break;
        }
    }
    sources
}

/// Highest risk among enriched members; unenriched members count as LOW.
fn aggregate_risk(items: &[FeedItem]) -> Risk {
    items.iter().map(|item| item.risk()).max().unwrap_or_default()
}

/// Case-insensitive union of member breakdown entries, capped.
fn merge_breakdowns(items: &[FeedItem]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for item in items {
        let Some(enrichment) = &item.enrichment else {
            continue;
        };
        for entry in &enrichment.beginner_breakdown {
            let cleaned = entry.trim();
            if !cleaned.is_empty() && seen.insert(cleaned.to_lowercase()) {
                merged.push(cleaned.to_string());
            }
        }
    }
    merged.truncate(MAX_BREAKDOWN);
    merged
}

/// Narrative bullets: the primary item's short summary, situation, and
/// impact fields split into sentences, one bullet each, plus a credit line
/// when more than one source contributed.
fn story_lines(primary: &FeedItem, sources: &[SourceRef]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(enrichment) = &primary.enrichment {
        for field in [
            &enrichment.tl_dr,
            &enrichment.what_happened,
            &enrichment.why_it_matters,
        ] {
            for sentence in split_sentences(field) {
                lines.push(format!("- {}", sentence));
            }
        }
    }

    if sources.len() > 1 {
        let also = sources[1..]
            .iter()
            .map(|source| source.source.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("- Also reported by {}.", also));
    }

    if lines.len() < MIN_STORY_LINES {
        lines.push(FILLER_LINE.to_string());
    }
    lines.truncate(MAX_STORY_LINES);
    lines
}

/// Splits on sentence-terminal punctuation only when followed by the start
/// of a new sentence (capital letter or digit), so abbreviations like
/// "e.g. versions" and identifiers like "CVE-2024.1" stay intact.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let starts_sentence =
                j > i + 1 && j < chars.len() && (chars[j].is_uppercase() || chars[j].is_ascii_digit());
            if starts_sentence {
                let sentence = current.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                current.clear();
                i = j;
                continue;
            }
        }
        i += 1;
    }

    let sentence = current.trim().to_string();
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
    sentences
}
