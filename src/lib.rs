pub mod clustering;
pub mod config;
pub mod dedupe;
pub mod editorial;
pub mod item;
pub mod llm;
pub mod logging;
pub mod normalize;
pub mod prompts;
pub mod relevance;
pub mod render;
pub mod rss;
pub mod state;
pub mod summarize;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_DIGEST: &str = "digest";

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

#[derive(Clone)]
pub struct LLMParams {
    pub llm_client: LLMClient,
    pub model: String,
    pub temperature: f32,
    pub require_json: bool,
}
