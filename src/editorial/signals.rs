//! Text-derived signal flags and the confidence and rationale rules built
//! on them.

use std::collections::HashSet;

use crate::clustering::TopicCluster;
use crate::item::Confidence;
use crate::normalize::contains_term;
use crate::relevance::{
    has_active_exploit_language, has_kev_language, has_patch_language, is_authoritative, item_text,
};

/// Language that suggests impact beyond a single organization.
const SECTOR_TERMS: [&str; 8] = [
    "critical infrastructure",
    "healthcare",
    "hospital",
    "energy",
    "utilities",
    "government agencies",
    "financial institutions",
    "schools",
];

const FALLBACK_REASON: &str = "Relevant context worth tracking.";

/// Boolean signals aggregated over the text of every member item.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalBundle {
    pub active_exploit: bool,
    pub kev_listed: bool,
    pub patch_available: bool,
    pub sector_impact: bool,
    pub multi_source: bool,
    pub authoritative: bool,
}

impl SignalBundle {
    pub fn from_cluster(cluster: &TopicCluster) -> Self {
        let text = cluster
            .items
            .iter()
            .map(item_text)
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let sources: HashSet<String> = cluster
            .items
            .iter()
            .map(|item| item.source.to_lowercase())
            .filter(|source| !source.is_empty())
            .collect();

        SignalBundle {
            active_exploit: has_active_exploit_language(&text),
            kev_listed: has_kev_language(&text),
            patch_available: has_patch_language(&text),
            sector_impact: SECTOR_TERMS.iter().any(|term| contains_term(&text, term)),
            multi_source: sources.len() > 1,
            authoritative: cluster.items.iter().any(|item| is_authoritative(&item.source)),
        }
    }

    /// KEV listing plus corroboration, or active exploitation backed by
    /// corroboration or an authoritative source, earns HIGH; any
    /// corroboration at all earns MEDIUM.
    pub fn confidence(&self) -> Confidence {
        if (self.kev_listed && self.multi_source)
            || (self.active_exploit && (self.multi_source || self.authoritative))
        {
            Confidence::High
        } else if self.multi_source || self.authoritative {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Up to two reason fragments explaining why the story made the
    /// digest, with a generic fallback when nothing applies.
    pub fn why_here(&self) -> String {
        let mut reasons: Vec<&str> = Vec::new();
        if self.active_exploit {
            reasons.push("Exploitation is being reported in the wild.");
        }
        if self.kev_listed {
            reasons.push("Flagged as known-exploited by an advisory body.");
        }
        if self.patch_available {
            reasons.push("A patch or mitigation is available now.");
        }
        if self.multi_source {
            reasons.push("Multiple independent sources corroborate it.");
        }
        if self.sector_impact {
            reasons.push("Sector-wide impact is plausible.");
        }

        if reasons.is_empty() {
            return FALLBACK_REASON.to_string();
        }
        reasons.truncate(2);
        reasons.join(" ")
    }
}
