//! Text normalization: URL and title identity, markup stripping.

use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};
use url::Url;

/// Query parameters that only carry tracking state and never change which
/// document a URL points at.
const TRACKING_PARAMS: [&str; 7] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
];

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Canonical form of a URL for duplicate detection: lowercased scheme and
/// host, fragment dropped, tracking parameters removed, remaining query
/// parameters kept in their original relative order. Unparseable input is
/// returned trimmed but otherwise untouched; empty input yields "".
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut parsed = match Url::parse(trimmed) {
        Ok(parsed) => parsed,
        Err(_) => return trimmed.to_string(),
    };
    parsed.set_fragment(None);

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        let rebuilt: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(kept.iter().map(|(key, value)| (key.as_str(), value.as_str())))
            .finish();
        parsed.set_query(Some(&rebuilt));
    }

    parsed.to_string()
}

/// Lowercases, collapses every non-alphanumeric run to a single space, and
/// trims. Empty input yields "".
pub fn normalize_title(title: &str) -> String {
    let spaced: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// SHA-256 over the normalized title, used as an equality key.
pub fn title_fingerprint(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_title(title).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Strips tags, decodes HTML entities, and collapses whitespace. Idempotent
/// on text that is already plain.
pub fn extract_plain_text(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }
    let stripped = TAG_RE.replace_all(markup, " ");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Substring match that refuses to fire inside a larger word, so "rce" does
/// not match "sources" and "law" does not match "flaw". Both arguments must
/// already be lowercased.
pub fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = text[start..].find(term) {
        let at = start + pos;
        let end = at + term.len();
        let before_ok = text[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..].chars().next().map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}

fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            // Entity names are short; a distant semicolon means a bare '&'.
            Some(end) if end <= 10 => match decode_entity(&tail[1..end]) {
                Some(decoded) => {
                    out.push(decoded);
                    rest = &tail[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &tail[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "hellip" => Some('\u{2026}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_strips_tracking_params_and_fragment() {
        assert_eq!(
            normalize_url("HTTP://X.com/a?utm_source=rss&utm_medium=feed#section"),
            "http://x.com/a"
        );
    }

    #[test]
    fn url_keeps_remaining_params_in_order() {
        assert_eq!(
            normalize_url("https://example.com/p?b=2&a=1&fbclid=abc"),
            "https://example.com/p?b=2&a=1"
        );
    }

    #[test]
    fn url_handles_empty_and_malformed_input() {
        assert_eq!(normalize_url(""), "");
        assert_eq!(normalize_url("   "), "");
        assert_eq!(normalize_url("not a url"), "not a url");
    }

    #[test]
    fn title_normalization_collapses_punctuation() {
        assert_eq!(normalize_title("  Hello,   World!! "), "hello world");
        assert_eq!(normalize_title(""), "");
        assert_eq!(normalize_title("###"), "");
    }

    #[test]
    fn fingerprint_matches_across_punctuation_variants() {
        assert_eq!(
            title_fingerprint("Cisco: IOS XE bug!"),
            title_fingerprint("cisco ios xe bug")
        );
        assert_ne!(title_fingerprint("one story"), title_fingerprint("another story"));
    }

    #[test]
    fn plain_text_strips_tags_and_entities() {
        assert_eq!(
            extract_plain_text("<p>Fish &amp; Chips</p>\n<br/>today"),
            "Fish & Chips today"
        );
        assert_eq!(extract_plain_text("&#8217;tis &#x27;quoted&#x27;"), "\u{2019}tis 'quoted'");
    }

    #[test]
    fn plain_text_is_idempotent() {
        let once = extract_plain_text("<b>5 &gt; 4 &amp; 3</b>");
        assert_eq!(extract_plain_text(&once), once);

        let plain = "already plain text with an & ampersand";
        assert_eq!(extract_plain_text(plain), plain);
    }

    #[test]
    fn contains_term_respects_word_boundaries() {
        assert!(contains_term("remote rce exploit", "rce"));
        assert!(!contains_term("multiple sources say", "rce"));
        assert!(contains_term("a new law passed", "law"));
        assert!(!contains_term("a critical flaw", "law"));
        assert!(contains_term("actively exploited in attacks", "exploited"));
    }
}
