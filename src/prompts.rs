// prompts.rs

use crate::item::FeedItem;
use crate::normalize::extract_plain_text;

/// Prompt for enriching a single item with strict JSON output.
pub fn enrichment_prompt(item: &FeedItem, tone_mode: &str) -> String {
    let summary_text = extract_plain_text(&item.summary);
    let tone_hint = if tone_mode == "spicy" {
        "Use a mild, professional sarcasm in spicy_take."
    } else {
        "Use a plain Analyst take that starts with 'Analyst take:' and contains no sarcasm."
    };

    format!(
        r#"You are a senior SOC analyst writing a threat digest for people new to threat intel. Be engaging but always clear and factual.
Tone rule: {tone_hint}

Return STRICT JSON with the required keys only.

Schema:
{{
  "risk": "LOW|MEDIUM|HIGH",
  "confidence": "LOW|MEDIUM|HIGH",
  "spicy_take": "1 sentence, slightly sarcastic but professional; must not be confusing",
  "tl_dr": "1 sentence, plain English",
  "what_happened": "2-4 sentences, factual",
  "why_it_matters": "2-4 sentences, practical impact",
  "beginner_breakdown": ["TERM - definition", "TERM - definition"],
  "attack_stage": "Initial Access|Execution|Persistence|Privilege Escalation|Defense Evasion|Credential Access|Discovery|Lateral Movement|Collection|Command and Control|Exfiltration|Impact|Unknown",
  "soc_focus": ["2-4 concrete detection/response ideas, plain English"],
  "tags": ["ransomware", "cve", "cloud"],
  "recommended_actions": ["max 3 actions, imperative voice"]
}}

Rules:
- Output valid JSON only. No markdown.
- Define any jargon used in beginner_breakdown.
- If source content is insufficient, set confidence LOW and say what is unclear.
- Do not invent facts.

Item:
Title: {title}
Source: {source}
Published: {published}
URL: {url}
Summary: {summary}
"#,
        tone_hint = tone_hint,
        title = item.title.trim(),
        source = item.source.trim(),
        published = item.published.trim(),
        url = item.url.trim(),
        summary = summary_text,
    )
}

/// Prompt for extracting digest-wide themes from the selected items.
pub fn themes_prompt(items: &[FeedItem]) -> String {
    let titles = items
        .iter()
        .map(|item| format!("- {}", item.title.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    let mut tags: Vec<String> = items
        .iter()
        .filter_map(|item| item.enrichment.as_ref())
        .flat_map(|enrichment| enrichment.tags.iter().cloned())
        .collect();
    tags.sort();
    tags.dedup();

    format!(
        r#"You are summarizing today's threat digest themes for beginners. Return STRICT JSON with the required keys only.

Schema:
{{
  "themes": ["short beginner-friendly theme", "..."],
  "one_line_rant": "short, safe, mildly sarcastic but clear"
}}

Rules:
- Output valid JSON only. No markdown.
- Themes must be understandable to a beginner.
- Keep one_line_rant short and professional.

Titles:
{titles}

Tags: {tags}
"#,
        titles = titles,
        tags = tags.join(", "),
    )
}
