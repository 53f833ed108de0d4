//! Item enrichment and theme generation with strict JSON validation.
//!
//! The model is treated as best-effort: invalid output is retried once,
//! then the item (or the themes block) is dropped without failing the run.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::item::{Confidence, Enrichment, FeedItem, Risk};
use crate::llm::generate_llm_response;
use crate::prompts;
use crate::{LLMParams, TARGET_LLM_REQUEST};

/// Attack stages the summarizer is allowed to emit.
const ALLOWED_ATTACK_STAGES: [&str; 13] = [
    "Initial Access",
    "Execution",
    "Persistence",
    "Privilege Escalation",
    "Defense Evasion",
    "Credential Access",
    "Discovery",
    "Lateral Movement",
    "Collection",
    "Command and Control",
    "Exfiltration",
    "Impact",
    "Unknown",
];

const MAX_ACTIONS: usize = 3;
const MAX_THEMES: usize = 4;
const PARSE_ATTEMPTS: usize = 2;

/// Raw enrichment payload; every key is required, so a missing field fails
/// deserialization and counts as invalid output.
#[derive(Debug, Deserialize)]
struct RawEnrichment {
    risk: String,
    confidence: String,
    spicy_take: String,
    tl_dr: String,
    what_happened: String,
    why_it_matters: String,
    beginner_breakdown: Vec<String>,
    attack_stage: String,
    soc_focus: Vec<String>,
    tags: Vec<String>,
    recommended_actions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawThemes {
    themes: Vec<String>,
    one_line_rant: String,
}

/// Digest-wide themes plus a closing one-liner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemePayload {
    pub themes: Vec<String>,
    pub one_line_rant: String,
}

/// Asks the model for a structured enrichment of one item. Returns `None`
/// when the model keeps producing invalid output; the caller drops the
/// item from the enriched set and continues.
pub async fn enrich_item(item: &FeedItem, params: &LLMParams, tone_mode: &str) -> Option<Enrichment> {
    let prompt = prompts::enrichment_prompt(item, tone_mode);

    for attempt in 1..=PARSE_ATTEMPTS {
        let response = generate_llm_response(&prompt, params).await?;
        match parse_enrichment(&response, tone_mode) {
            Ok(enrichment) => return Some(enrichment),
            Err(err) => {
                warn!(
                    target: TARGET_LLM_REQUEST,
                    "Invalid enrichment output (attempt {}): {}", attempt, err
                );
            }
        }
    }

    info!(target: TARGET_LLM_REQUEST, "Skipping item after invalid JSON: {}", item.title);
    None
}

/// Asks the model for digest-wide themes over the selected items.
pub async fn generate_themes(items: &[FeedItem], params: &LLMParams) -> Option<ThemePayload> {
    if items.is_empty() {
        return None;
    }
    let prompt = prompts::themes_prompt(items);
    let response = generate_llm_response(&prompt, params).await?;

    match parse_themes(&response) {
        Ok(payload) => Some(payload),
        Err(err) => {
            warn!(target: TARGET_LLM_REQUEST, "Skipping themes due to invalid output: {}", err);
            None
        }
    }
}

fn parse_enrichment(response: &str, tone_mode: &str) -> Result<Enrichment> {
    let raw: RawEnrichment = serde_json::from_str(response.trim())?;

    let risk: Risk = raw.risk.parse()?;
    let confidence: Confidence = raw.confidence.parse()?;

    let attack_stage = raw.attack_stage.trim().to_string();
    if !ALLOWED_ATTACK_STAGES.contains(&attack_stage.as_str()) {
        return Err(anyhow!("invalid attack_stage value: {}", attack_stage));
    }

    let beginner_breakdown = clean_list(raw.beginner_breakdown);
    let soc_focus = clean_list(raw.soc_focus);
    if beginner_breakdown.is_empty() {
        return Err(anyhow!("beginner_breakdown must not be empty"));
    }
    if soc_focus.is_empty() {
        return Err(anyhow!("soc_focus must not be empty"));
    }

    let mut recommended_actions = clean_list(raw.recommended_actions);
    recommended_actions.truncate(MAX_ACTIONS);

    let mut spicy_take = raw.spicy_take.trim().to_string();
    if tone_mode != "spicy" && !spicy_take.to_lowercase().starts_with("analyst take") {
        spicy_take = format!("Analyst take: {}", spicy_take);
    }

    Ok(Enrichment {
        risk,
        confidence,
        spicy_take,
        tl_dr: raw.tl_dr.trim().to_string(),
        what_happened: raw.what_happened.trim().to_string(),
        why_it_matters: raw.why_it_matters.trim().to_string(),
        beginner_breakdown,
        attack_stage,
        soc_focus,
        tags: clean_list(raw.tags),
        recommended_actions,
    })
}

fn parse_themes(response: &str) -> Result<ThemePayload> {
    let raw: RawThemes = serde_json::from_str(response.trim())?;

    let mut themes = clean_list(raw.themes);
    if themes.is_empty() {
        return Err(anyhow!("themes must not be empty"));
    }
    themes.truncate(MAX_THEMES);

    Ok(ThemePayload {
        themes,
        one_line_rant: raw.one_line_rant.trim().to_string(),
    })
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}
