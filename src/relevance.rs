//! Deterministic relevance filtering and scoring.
//!
//! All weights and keyword tables are fixed configuration data so scoring
//! stays auditable and testable in isolation from clustering.

use lazy_static::lazy_static;
use regex::Regex;

use crate::item::FeedItem;
use crate::normalize::{contains_term, extract_plain_text};

/// Substrings that mark an item as security-relevant.
const KEYWORDS: [&str; 9] = [
    "cve-",
    "zero-day",
    "0-day",
    "exploited",
    "ransomware",
    "data leak",
    "supply chain",
    "credential",
    "phishing",
];

/// Sources whose name alone is enough to keep an item.
const AUTHORITATIVE_SOURCES: [&str; 2] = ["cisa", "ncsc"];

/// Language that indicates ongoing exploitation.
pub const ACTIVE_EXPLOIT_TERMS: [&str; 3] =
    ["actively exploited", "in the wild", "active exploitation"];

/// Language that indicates a KEV listing or equivalent directive.
pub const KEV_TERMS: [&str; 3] = ["kev", "known exploited", "emergency directive"];

/// Language that indicates a fix is available.
pub const PATCH_TERMS: [&str; 5] = ["patch", "patched", "hotfix", "fixed", "mitigation"];

/// Exploit techniques worth an extra signal bump.
const TECHNIQUE_TERMS: [&str; 4] = ["zero-day", "0-day", "rce", "auth bypass"];

/// Policy-only coverage, penalized so advisories outrank legal news.
const POLICY_TERMS: [&str; 5] = ["policy", "regulation", "law", "compliance", "sanction"];

/// Combined title+summary shorter than this is treated as near-empty.
const SHORT_TEXT_FLOOR: usize = 140;

lazy_static! {
    pub static ref CVE_RE: Regex = Regex::new(r"(?i)CVE-\d{4}-\d{4,7}").unwrap();
}

/// Title plus plain-text summary, the text every signal check runs over.
pub fn item_text(item: &FeedItem) -> String {
    format!("{} {}", item.title, extract_plain_text(&item.summary))
}

pub fn matches_keyword_signal(text: &str) -> bool {
    let lower = text.to_lowercase();
    KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn is_authoritative(source: &str) -> bool {
    let lower = source.to_lowercase();
    AUTHORITATIVE_SOURCES.iter().any(|name| lower.contains(name))
}

pub fn has_active_exploit_language(lower: &str) -> bool {
    ACTIVE_EXPLOIT_TERMS.iter().any(|term| contains_term(lower, term))
}

pub fn has_kev_language(lower: &str) -> bool {
    KEV_TERMS.iter().any(|term| contains_term(lower, term))
}

pub fn has_patch_language(lower: &str) -> bool {
    PATCH_TERMS.iter().any(|term| contains_term(lower, term))
}

/// Deterministic importance score for one item. Each signal group counts
/// once; there is no normalization, ties are broken later by stable sort
/// order.
pub fn score_item(item: &FeedItem) -> i64 {
    let text = item_text(item).to_lowercase();
    let mut score = 0;

    if has_active_exploit_language(&text) {
        score += 5;
    }
    if has_kev_language(&text) {
        score += 4;
    }
    if TECHNIQUE_TERMS.iter().any(|term| contains_term(&text, term)) {
        score += 3;
    }
    if CVE_RE.is_match(&text) {
        score += 3;
    }
    if contains_term(&text, "exploited") {
        score += 2;
    }
    if contains_term(&text, "ransomware") {
        score += 2;
    }
    if text.contains("supply chain") {
        score += 2;
    }
    if text.contains("data leak") {
        score += 2;
    }
    if text.contains("credential") {
        score += 2;
    }
    if text.contains("phishing") {
        score += 2;
    }
    if has_patch_language(&text) {
        score += 1;
    }
    if is_authoritative(&item.source) {
        score += 3;
    }

    if text.chars().count() < SHORT_TEXT_FLOOR {
        score -= 2;
    }
    if POLICY_TERMS.iter().any(|term| contains_term(&text, term)) {
        score -= 2;
    }

    score
}

/// Keeps an item iff it matches a keyword signal or comes from an
/// authoritative source, rewriting the kept item's summary to plain text.
/// An empty result is the caller's problem: the pipeline falls back to the
/// unfiltered deduplicated batch rather than aborting.
pub fn filter_items(items: &[FeedItem]) -> Vec<FeedItem> {
    let mut kept = Vec::new();
    for item in items {
        let summary_text = extract_plain_text(&item.summary);
        let combined = format!("{} {}", item.title, summary_text);
        if matches_keyword_signal(&combined) || is_authoritative(&item.source) {
            let mut item = item.clone();
            item.summary = summary_text;
            kept.push(item);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: &str, source: &str) -> FeedItem {
        FeedItem {
            title: title.to_string(),
            summary: summary.to_string(),
            source: source.to_string(),
            ..FeedItem::default()
        }
    }

    #[test]
    fn keyword_and_authority_checks() {
        assert!(matches_keyword_signal("New ransomware campaign"));
        assert!(matches_keyword_signal("Tracking CVE-2024-1234"));
        assert!(!matches_keyword_signal("Quarterly earnings call"));
        assert!(is_authoritative("CISA Alerts"));
        assert!(is_authoritative("NCSC Feed"));
        assert!(!is_authoritative("Vendor Blog"));
    }

    #[test]
    fn score_rewards_exploitation_signals() {
        let hot = item(
            "Cisco zero-day actively exploited",
            "CVE-2024-1234 is under active exploitation; a patch is available.",
            "CISA",
        );
        // active(5) + technique(3) + cve(3) + exploited(2) + patch(1)
        // + authority(3) - short(2)
        assert_eq!(score_item(&hot), 15);
    }

    #[test]
    fn score_penalizes_near_empty_and_policy_items() {
        let thin = item("Short note", "", "Vendor Blog");
        assert_eq!(score_item(&thin), -2);

        let policy = item("New regulation proposed for breach reporting", "", "Vendor Blog");
        assert!(score_item(&policy) < 0);
    }

    #[test]
    fn score_ignores_terms_buried_inside_words() {
        // "sources" must not count as "rce", "flaw" must not count as "law".
        let benign = item("Multiple sources describe a flaw", "", "Vendor Blog");
        assert_eq!(score_item(&benign), -2);
    }

    #[test]
    fn filter_keeps_authoritative_items_and_rewrites_summary() {
        let items = vec![
            item("Routine advisory", "<p>Apply &amp; verify updates.</p>", "CISA"),
            item("Gadget review", "<p>Shiny.</p>", "Tech Blog"),
        ];
        let kept = filter_items(&items);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].summary, "Apply & verify updates.");
    }

    #[test]
    fn filter_can_empty_a_batch() {
        let items = vec![item("Gadget review", "Shiny.", "Tech Blog")];
        assert!(filter_items(&items).is_empty());
    }
}
