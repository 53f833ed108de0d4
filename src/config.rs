//! Run configuration: feed list from disk, LLM settings from the
//! environment.

use std::env;
use std::fs;
use std::path::Path;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{LLMClient, LLMParams, TARGET_DIGEST};

/// Feeds used when no config file is present.
pub const DEFAULT_FEEDS: [&str; 8] = [
    "https://www.cisa.gov/uscert/ncas/alerts.xml",
    "https://www.cisa.gov/uscert/ncas/current-activity.xml",
    "https://www.ncsc.gov.uk/api/1/services/v1/all-rss-feed.xml",
    "https://www.bleepingcomputer.com/feed/",
    "https://thehackernews.com/feeds/posts/default",
    "https://krebsonsecurity.com/feed/",
    "https://msrc.microsoft.com/blog/feed/",
    "https://blog.google/threat-analysis-group/rss/",
];

const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OLLAMA_MODEL: &str = "llama3";
const DEFAULT_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone, Default, Deserialize)]
struct DigestConfig {
    #[serde(default)]
    feeds: Vec<String>,
}

/// Loads the feed list from a JSON config file. A missing file, unreadable
/// file, or empty feed list falls back to the built-in defaults.
pub fn load_feed_urls(path: &Path) -> Vec<String> {
    if !path.exists() {
        info!(target: TARGET_DIGEST, "No config at {}, using default feeds", path.display());
        return default_feeds();
    }

    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(target: TARGET_DIGEST, "Failed to read {}: {}", path.display(), err);
            return default_feeds();
        }
    };
    match serde_json::from_str::<DigestConfig>(&raw) {
        Ok(config) if !config.feeds.is_empty() => config.feeds,
        Ok(_) => default_feeds(),
        Err(err) => {
            warn!(target: TARGET_DIGEST, "Failed to parse {}: {}", path.display(), err);
            default_feeds()
        }
    }
}

fn default_feeds() -> Vec<String> {
    DEFAULT_FEEDS.iter().map(|feed| feed.to_string()).collect()
}

/// Builds LLM parameters from the environment: `OPENAI_API_KEY` selects
/// OpenAI, otherwise a local Ollama at `OLLAMA_HOST`/`OLLAMA_PORT` is used.
/// `LLM_MODEL` and `LLM_TEMPERATURE` override the defaults for either.
pub fn llm_params_from_env(require_json: bool) -> LLMParams {
    let temperature: f32 = env::var("LLM_TEMPERATURE")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_TEMPERATURE);

    if let Ok(api_key) = env::var("OPENAI_API_KEY") {
        let client = OpenAIClient::with_config(OpenAIConfig::new().with_api_key(api_key));
        return LLMParams {
            llm_client: LLMClient::OpenAI(client),
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string()),
            temperature,
            require_json,
        };
    }

    let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost".to_string());
    let port: u16 = env::var("OLLAMA_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(11434);
    info!(target: TARGET_DIGEST, "Using Ollama at {}:{}", host, port);

    LLMParams {
        llm_client: LLMClient::Ollama(Ollama::new(host, port)),
        model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
        temperature,
        require_json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let feeds = load_feed_urls(Path::new("/nonexistent/config.json"));
        assert_eq!(feeds.len(), DEFAULT_FEEDS.len());
    }

    #[test]
    fn config_feeds_override_defaults() {
        let path = std::env::temp_dir().join("threat-digest-config-test.json");
        fs::write(&path, r#"{"feeds": ["http://example.com/feed"]}"#).unwrap();
        assert_eq!(load_feed_urls(&path), vec!["http://example.com/feed".to_string()]);

        fs::write(&path, r#"{"feeds": []}"#).unwrap();
        assert_eq!(load_feed_urls(&path).len(), DEFAULT_FEEDS.len());

        fs::write(&path, "{broken").unwrap();
        assert_eq!(load_feed_urls(&path).len(), DEFAULT_FEEDS.len());
        let _ = fs::remove_file(&path);
    }
}
