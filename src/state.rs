//! Persistence of processed-item URLs between runs.
//!
//! Only used to decide what a run hands to the summarizer; clustering and
//! scoring never look at it.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::TARGET_DIGEST;

/// Most recent processed URLs retained across runs.
const MAX_URLS: usize = 2000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    #[serde(default)]
    pub last_run_utc: String,
    #[serde(default)]
    pub processed_urls: Vec<String>,
}

impl RunState {
    /// Loads state from disk; a missing or corrupt file degrades to the
    /// default empty state rather than failing the run.
    pub fn load(path: &Path) -> RunState {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return RunState::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    target: TARGET_DIGEST,
                    "Ignoring corrupt state file {}: {}", path.display(), err
                );
                RunState::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)?;
        Ok(())
    }

    pub fn should_process(&self, url: &str) -> bool {
        !url.is_empty() && !self.processed_urls.iter().any(|seen| seen == url)
    }

    /// Records a URL, keeping only the most recent `MAX_URLS` entries.
    pub fn mark_processed(&mut self, url: &str) {
        if url.is_empty() || self.processed_urls.iter().any(|seen| seen == url) {
            return;
        }
        let mut urls: VecDeque<String> = self.processed_urls.drain(..).collect();
        while urls.len() >= MAX_URLS {
            urls.pop_front();
        }
        urls.push_back(url.to_string());
        self.processed_urls = urls.into();
    }
}
