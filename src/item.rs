//! Item and enrichment types shared across the pipeline.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity level, ordered LOW < MEDIUM < HIGH.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Risk {
    #[default]
    Low,
    Medium,
    High,
}

impl Risk {
    pub fn as_str(&self) -> &'static str {
        match self {
            Risk::Low => "LOW",
            Risk::Medium => "MEDIUM",
            Risk::High => "HIGH",
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Risk {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "LOW" => Ok(Risk::Low),
            "MEDIUM" => Ok(Risk::Medium),
            "HIGH" => Ok(Risk::High),
            other => Err(anyhow!("unrecognized risk level: {}", other)),
        }
    }
}

/// How much we trust a story, ordered LOW < MEDIUM < HIGH.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "LOW",
            Confidence::Medium => "MEDIUM",
            Confidence::High => "HIGH",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "LOW" => Ok(Confidence::Low),
            "MEDIUM" => Ok(Confidence::Medium),
            "HIGH" => Ok(Confidence::High),
            other => Err(anyhow!("unrecognized confidence level: {}", other)),
        }
    }
}

/// One feed entry as it moves through the pipeline. Created by ingestion,
/// enriched in place by the summarizer, otherwise read-only downstream
/// except for `summary`, which the relevance filter rewrites to plain text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub url: String,
    pub source: String,
    /// Raw published string as the feed delivered it.
    pub published: String,
    pub published_at: Option<DateTime<Utc>>,
    pub summary: String,
    pub enrichment: Option<Enrichment>,
}

impl FeedItem {
    /// Risk assigned by the summarizer; unenriched items default to LOW.
    pub fn risk(&self) -> Risk {
        self.enrichment
            .as_ref()
            .map(|enrichment| enrichment.risk)
            .unwrap_or_default()
    }
}

/// Structured narrative fields produced by the summarizer for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub risk: Risk,
    pub confidence: Confidence,
    pub spicy_take: String,
    pub tl_dr: String,
    pub what_happened: String,
    pub why_it_matters: String,
    pub beginner_breakdown: Vec<String>,
    pub attack_stage: String,
    pub soc_focus: Vec<String>,
    pub tags: Vec<String>,
    pub recommended_actions: Vec<String>,
}
