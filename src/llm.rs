//! LLM request plumbing shared by item enrichment and theme generation.

use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client as OpenAIClient;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use ollama_rs::Ollama;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, info, warn};

use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

const LLM_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: usize = 3;
const MAX_TOKENS: u32 = 1024;

/// Sends one prompt, retrying with exponential backoff. Returns `None`
/// when every attempt fails or comes back empty; callers treat that as
/// best-effort and move on.
pub async fn generate_llm_response(prompt: &str, params: &LLMParams) -> Option<String> {
    let mut backoff = 2;

    for retry_count in 0..MAX_RETRIES {
        debug!(target: TARGET_LLM_REQUEST, "Sending LLM request ({} chars)", prompt.len());
        let result = match &params.llm_client {
            LLMClient::Ollama(ollama) => generate_ollama(ollama, prompt, params).await,
            LLMClient::OpenAI(client) => generate_openai(client, prompt, params).await,
        };

        match result {
            Ok(response) if !response.trim().is_empty() => {
                debug!(target: TARGET_LLM_REQUEST, "LLM response received");
                return Some(response);
            }
            Ok(_) => warn!(target: TARGET_LLM_REQUEST, "Empty response from model"),
            Err(err) => warn!(target: TARGET_LLM_REQUEST, "Error generating response: {}", err),
        }

        if retry_count < MAX_RETRIES - 1 {
            info!(
                target: TARGET_LLM_REQUEST,
                "Retrying LLM request... ({}/{})", retry_count + 1, MAX_RETRIES
            );
            sleep(Duration::from_secs(backoff)).await;
            backoff *= 2;
        }
    }

    error!(target: TARGET_LLM_REQUEST, "No response generated after {} retries", MAX_RETRIES);
    None
}

async fn generate_ollama(ollama: &Ollama, prompt: &str, params: &LLMParams) -> Result<String> {
    let mut request = GenerationRequest::new(params.model.clone(), prompt.to_string());
    request.options = Some(GenerationOptions::default().temperature(params.temperature));

    let response = timeout(LLM_TIMEOUT, ollama.generate(request))
        .await
        .map_err(|_| anyhow!("LLM request timed out"))?
        .map_err(|err| anyhow!("LLM request failed: {}", err))?;
    Ok(response.response)
}

async fn generate_openai(
    client: &OpenAIClient<OpenAIConfig>,
    prompt: &str,
    params: &LLMParams,
) -> Result<String> {
    let message = ChatCompletionRequestUserMessageArgs::default()
        .content(prompt)
        .build()?;

    let mut builder = CreateChatCompletionRequestArgs::default();
    builder
        .model(params.model.clone())
        .temperature(params.temperature)
        .max_tokens(MAX_TOKENS)
        .messages([message.into()]);
    if params.require_json {
        builder.response_format(ResponseFormat::JsonObject);
    }
    let request = builder.build()?;

    let response = timeout(LLM_TIMEOUT, client.chat().create(request))
        .await
        .map_err(|_| anyhow!("LLM request timed out"))?
        .map_err(|err| anyhow!("LLM request failed: {}", err))?;

    Ok(response
        .choices
        .first()
        .and_then(|choice| choice.message.content.clone())
        .unwrap_or_default())
}
